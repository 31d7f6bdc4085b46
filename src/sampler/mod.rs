use anyhow::Context;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use reqwest::{header, Client, Response};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::sources::Resolution;
use crate::utils::{extract_domain, filename_from_content_disposition};
use crate::{MediaInfoError, Result};

/// A size-bounded prefix of a remote file, stored in a uniquely named temp file
///
/// The file is removed when the sample is closed or dropped, so a request that is
/// cancelled halfway through never leaves its artifact behind.
#[derive(Debug)]
pub struct MediaSample {
    file: NamedTempFile,
    bytes_written: u64,
    declared_length: Option<u64>,
    suggested_name: Option<String>,
    source_url: String,
    created_at: DateTime<Utc>,
}

impl MediaSample {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of bytes actually stored
    pub fn len(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_empty(&self) -> bool {
        self.bytes_written == 0
    }

    /// Total size reported by the origin, which may exceed the sample
    pub fn declared_length(&self) -> Option<u64> {
        self.declared_length
    }

    /// File name announced by the origin's `Content-Disposition` header
    pub fn suggested_name(&self) -> Option<&str> {
        self.suggested_name.as_deref()
    }

    /// URL the bytes were fetched from
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Delete the artifact, logging rather than returning any failure
    pub fn close(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => tracing::debug!("Removed sample {}", path.display()),
            Err(e) => tracing::warn!("Failed to remove sample {}: {}", path.display(), e),
        }
    }
}

/// Streams bounded samples of remote files to disk
pub struct Sampler {
    client: Client,
    max_bytes: u64,
    temp_dir: Option<PathBuf>,
}

impl Sampler {
    /// Build a sampler from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.sampler.user_agent.clone())
            .timeout(config.download_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            max_bytes: config.sampler.max_sample_bytes,
            temp_dir: config.app.temp_dir.clone(),
        })
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Fetch the first working candidate of a resolution
    ///
    /// Indirect resolutions skip candidates that fail and report `AllSourcesFailed` once
    /// the list is exhausted; direct URLs surface their own error.
    pub async fn fetch_first(&self, resolution: &Resolution) -> Result<MediaSample> {
        if !resolution.indirect {
            let url = resolution
                .candidates
                .first()
                .map(String::as_str)
                .unwrap_or(&resolution.original_url);
            return self.fetch(url).await;
        }

        for (index, candidate) in resolution.candidates.iter().enumerate() {
            match self.fetch(candidate).await {
                Ok(sample) => {
                    tracing::info!(
                        "{} candidate {} of {} succeeded",
                        resolution.platform,
                        index + 1,
                        resolution.candidates.len()
                    );
                    return Ok(sample);
                }
                Err(e) => {
                    tracing::warn!(
                        "{} candidate {} of {} rejected: {:#}",
                        resolution.platform,
                        index + 1,
                        resolution.candidates.len(),
                        e
                    );
                }
            }
        }

        Err(MediaInfoError::AllSourcesFailed {
            attempts: resolution.candidates.len(),
        }
        .into())
    }

    /// Download at most `max_bytes` of `url` into a new temp file
    pub async fn fetch(&self, url: &str) -> Result<MediaSample> {
        tracing::info!(
            "Sampling up to {} bytes from {}",
            self.max_bytes,
            extract_domain(url).unwrap_or_else(|| "unknown host".to_string())
        );

        let response = self.open(url).await?;

        let declared_length = response.content_length();
        let suggested_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition);

        let mut file = self.create_artifact()?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| MediaInfoError::DownloadFailed {
                url: url.to_string(),
                source,
            })?;

            let remaining = self.max_bytes - written;
            let take = (chunk.len() as u64).min(remaining) as usize;
            file.write_all(&chunk[..take]).map_err(MediaInfoError::Io)?;
            written += take as u64;

            if written >= self.max_bytes {
                tracing::debug!("Sample limit reached, dropping the rest of the stream");
                break;
            }
        }

        file.flush().map_err(MediaInfoError::Io)?;

        tracing::debug!(
            "Stored {} bytes (declared {:?}) at {}",
            written,
            declared_length,
            file.path().display()
        );

        Ok(MediaSample {
            file,
            bytes_written: written,
            declared_length,
            suggested_name,
            source_url: url.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Send the GET request and reject unsuccessful responses
    async fn open(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| MediaInfoError::DownloadFailed {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let html = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|ct| ct.to_str().ok())
                .map(|ct| ct.to_lowercase().contains("text/html"))
                .unwrap_or(false);

            return Err(MediaInfoError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
                html,
            }
            .into());
        }

        Ok(response)
    }

    fn create_artifact(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("mediainfo-sample-").suffix(".tmp");

        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(MediaInfoError::Io)?;

        Ok(file)
    }
}
