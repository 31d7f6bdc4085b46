use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mediainfo-api",
    about = "MediaInfo API - Inspect remote media files from a small sample of their bytes",
    version,
    long_about = "An HTTP service that downloads the first few megabytes of a media URL (direct links or Google Drive sharing links), analyzes them with MediaInfo and answers with JSON or a MediaInfo-style text report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a YAML configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "MEDIAINFO_API_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Address the server binds to
    #[arg(long, global = true, env = "HOST", value_name = "HOST")]
    pub host: Option<String>,

    /// Port the server listens on
    #[arg(short, long, global = true, env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default when no command is given)
    Serve,

    /// Analyze a single URL and print the report
    Probe {
        /// Media URL (direct link or Google Drive sharing link)
        #[arg(value_name = "URL")]
        url: String,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MediaInfo style text report
    Text,
    /// Structured JSON document
    Json,
}

impl OutputFormat {
    /// Parse a query-string value, ignoring case and surrounding whitespace
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
