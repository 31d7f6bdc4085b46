//! MediaInfo API - sample remote media files and describe them
//!
//! This library downloads a bounded prefix of a media URL (resolving Google Drive sharing
//! links on the way), runs the `mediainfo` tool over the sample and renders the reported
//! tracks as a JSON document or as a MediaInfo-style text report.

pub mod cli;
pub mod config;
pub mod extract;
pub mod output;
pub mod sampler;
pub mod server;
pub mod service;
pub mod sources;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extract::{MetadataExtractor, Track, TrackKind};
pub use output::Presentation;
pub use sampler::{MediaSample, Sampler};
pub use service::{AnalysisPipeline, SourceRequest};
pub use sources::{Resolution, ResolverRegistry, SourceResolver};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the media info service
#[derive(thiserror::Error, Debug)]
pub enum MediaInfoError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid source URL: {0}")]
    InvalidSourceUrl(String),

    #[error("HTTP {status} from {url}{}", html_note(.html))]
    HttpStatus { status: u16, url: String, html: bool },

    #[error("Download failed for {url}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("All {attempts} download methods failed - file may be private or restricted")]
    AllSourcesFailed { attempts: usize },

    #[error("Media analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

fn html_note(html: &bool) -> &'static str {
    if *html {
        " (HTML error page)"
    } else {
        ""
    }
}

impl MediaInfoError {
    /// Whether the failure was caused by the client rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, MediaInfoError::MissingParameter(_))
    }
}
