use super::SourceResolver;
use crate::Result;

/// Fallback resolver for URLs that already point at the file bytes
pub struct DirectResolver;

impl SourceResolver for DirectResolver {
    fn supports_url(&self, _url: &str) -> bool {
        true
    }

    fn candidates(&self, url: &str) -> Result<Vec<String>> {
        Ok(vec![url.to_string()])
    }

    fn platform_name(&self) -> &'static str {
        "Direct URL"
    }

    fn is_indirect(&self) -> bool {
        false
    }
}
