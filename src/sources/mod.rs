use serde::Serialize;

pub mod direct;
pub mod gdrive;

use crate::utils::validate_and_normalize_url;
use crate::{MediaInfoError, Result};

/// Outcome of resolving a user supplied URL into fetchable candidates
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// URL exactly as the client sent it
    pub original_url: String,

    /// Direct download URLs, most reliable first
    pub candidates: Vec<String>,

    /// Name of the resolver that produced the candidates
    pub platform: &'static str,

    /// Whether the original URL was a sharing link that had to be rewritten
    pub indirect: bool,
}

/// Trait for turning source URLs into direct download URLs
pub trait SourceResolver: Send + Sync {
    /// Check if this resolver handles the given URL
    fn supports_url(&self, url: &str) -> bool;

    /// Build the ordered list of candidate URLs
    fn candidates(&self, url: &str) -> Result<Vec<String>>;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;

    /// Whether candidates point somewhere other than the input URL
    fn is_indirect(&self) -> bool {
        true
    }
}

/// Registry for managing multiple resolvers
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn SourceResolver>>,
}

impl ResolverRegistry {
    /// Create a new registry with default resolvers
    pub fn new() -> Self {
        let mut registry = Self {
            resolvers: Vec::new(),
        };

        registry.register(Box::new(gdrive::GoogleDriveResolver::new()));

        registry
    }

    /// Register a new resolver; later registrations are consulted last
    pub fn register(&mut self, resolver: Box<dyn SourceResolver>) {
        self.resolvers.push(resolver);
    }

    /// Find a resolver that supports the given URL
    pub fn find_resolver(&self, url: &str) -> Option<&dyn SourceResolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.supports_url(url))
            .map(|boxed| boxed.as_ref())
    }

    /// List all supported platforms
    pub fn list_platforms(&self) -> Vec<&'static str> {
        let mut platforms: Vec<_> = self
            .resolvers
            .iter()
            .map(|resolver| resolver.platform_name())
            .collect();
        platforms.push(direct::DirectResolver.platform_name());
        platforms
    }

    /// Resolve a URL, falling back to fetching it directly
    pub fn resolve(&self, url: &str) -> Result<Resolution> {
        let url = url.trim();
        validate_and_normalize_url(url)?;

        let direct = direct::DirectResolver;
        let resolver = self.find_resolver(url).unwrap_or(&direct);

        let candidates = resolver.candidates(url)?;
        if candidates.is_empty() {
            return Err(MediaInfoError::InvalidSourceUrl(format!(
                "{} produced no download URL for {}",
                resolver.platform_name(),
                url
            ))
            .into());
        }

        tracing::debug!(
            platform = resolver.platform_name(),
            candidates = candidates.len(),
            "Resolved source URL"
        );

        Ok(Resolution {
            original_url: url.to_string(),
            candidates,
            platform: resolver.platform_name(),
            indirect: resolver.is_indirect(),
        })
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
