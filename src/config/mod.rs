use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::OutputFormat;

/// Largest sample the service will ever buffer, regardless of configuration
pub const MAX_SAMPLE_CEILING: u64 = 256 * 1024 * 1024;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Sample download settings
    pub sampler: SamplerConfig,

    /// External analysis tool settings
    pub extractor: ExtractorConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Listening port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Maximum number of bytes downloaded per request
    pub max_sample_bytes: u64,

    /// Total timeout for one download attempt
    pub timeout_secs: u64,

    /// Timeout for establishing the connection
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Path or name of the mediainfo binary
    pub mediainfo_path: String,

    /// Wall-clock budget for one analysis
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for temporary samples (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,

    /// Format used when the request does not name one
    pub default_output_format: OutputFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_sample_bytes: 10 * 1024 * 1024,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mediainfo_path: "mediainfo".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            default_output_format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the default locations, or built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_path().ok().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("mediainfo-api").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.sampler.max_sample_bytes == 0 {
            anyhow::bail!("sampler.max_sample_bytes must be greater than zero");
        }

        if self.sampler.max_sample_bytes > MAX_SAMPLE_CEILING {
            anyhow::bail!(
                "sampler.max_sample_bytes must not exceed {} bytes",
                MAX_SAMPLE_CEILING
            );
        }

        if self.sampler.timeout_secs == 0 || self.extractor.timeout_secs == 0 {
            anyhow::bail!("timeouts must be at least one second");
        }

        if self.extractor.mediainfo_path.trim().is_empty() {
            anyhow::bail!("extractor.mediainfo_path must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Listen: {}:{}", self.server.host, self.server.port);
        println!("  Max Sample: {} bytes", self.sampler.max_sample_bytes);
        println!("  Download Timeout: {}s", self.sampler.timeout_secs);
        println!("  MediaInfo: {}", self.extractor.mediainfo_path);
        println!("  Analysis Timeout: {}s", self.extractor.timeout_secs);
        if let Some(dir) = &self.app.temp_dir {
            println!("  Temp Dir: {}", dir.display());
        }
        println!("  Default Format: {}", self.app.default_output_format);
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.sampler.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.sampler.connect_timeout_secs)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.extractor.timeout_secs)
    }
}
