use once_cell::sync::Lazy;
use regex::Regex;

use super::SourceResolver;
use crate::{MediaInfoError, Result};

const GDRIVE_HOSTS: &[&str] = &["drive.google.com", "docs.google.com"];

/// File id patterns, tried in order
static FILE_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/file/d/([a-zA-Z0-9_-]+)",
        r"id=([a-zA-Z0-9_-]+)",
        r"/open\?id=([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Failed to compile Google Drive id pattern"))
    .collect()
});

/// Google Drive sharing link resolver
///
/// Sharing links open an HTML viewer, so the file id is pulled out of the link and turned
/// into the download endpoints Drive serves without credentials.
pub struct GoogleDriveResolver;

impl GoogleDriveResolver {
    pub fn new() -> Self {
        Self
    }

    /// Extract the file id from a sharing link
    pub fn extract_file_id(url: &str) -> Option<String> {
        FILE_ID_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Direct download URLs for a file id, most reliable first
    pub fn download_urls(file_id: &str) -> Vec<String> {
        vec![
            format!("https://drive.usercontent.google.com/download?id={}&export=download", file_id),
            format!("https://drive.google.com/uc?export=download&id={}&confirm=t", file_id),
            format!("https://docs.google.com/uc?export=download&id={}", file_id),
        ]
    }
}

impl SourceResolver for GoogleDriveResolver {
    fn supports_url(&self, url: &str) -> bool {
        GDRIVE_HOSTS.iter().any(|host| url.contains(host))
    }

    fn candidates(&self, url: &str) -> Result<Vec<String>> {
        let file_id = Self::extract_file_id(url).ok_or_else(|| {
            MediaInfoError::InvalidSourceUrl(format!(
                "Could not extract Google Drive file ID from {}",
                url
            ))
        })?;

        Ok(Self::download_urls(&file_id))
    }

    fn platform_name(&self) -> &'static str {
        "Google Drive"
    }
}

impl Default for GoogleDriveResolver {
    fn default() -> Self {
        Self::new()
    }
}
