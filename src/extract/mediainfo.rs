use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{MetadataExtractor, Track, TrackKind};
use crate::config::Config;
use crate::{MediaInfoError, Result};

/// MediaInfo keys whose canonical names do not follow from snake-casing
const RENAMED_FIELDS: &[(&str, &str)] = &[
    ("Channels", "channel_s"),
    ("Format_Commercial_IfAny", "commercial_name"),
    ("Format_Commercial", "commercial_name"),
    ("Encoded_Application", "writing_application"),
    ("Encoded_Library", "writing_library"),
    ("Encoded_Library_Name", "writing_library_name"),
    ("ElementCount", "count_of_elements"),
    ("Format_AdditionalFeatures", "format_additionalfeatures"),
];

#[derive(Debug, Deserialize)]
struct MediaInfoOutput {
    media: Option<MediaSection>,
}

#[derive(Debug, Deserialize)]
struct MediaSection {
    #[serde(default)]
    track: Value,
}

/// Metadata extractor backed by the `mediainfo` command line tool
pub struct MediaInfoCli {
    binary: String,
    timeout: Duration,
}

impl MediaInfoCli {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.extractor.mediainfo_path.clone(), config.analysis_timeout())
    }

    async fn run(&self, path: &Path) -> Result<Vec<u8>> {
        tracing::debug!("Running {} on {}", self.binary, path.display());

        let output = Command::new(&self.binary)
            .arg("--Output=JSON")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| {
                MediaInfoError::AnalysisFailed(format!(
                    "{} timed out after {}s",
                    self.binary,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                MediaInfoError::AnalysisFailed(format!("could not run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(MediaInfoError::AnalysisFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                error.trim()
            ))
            .into());
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MetadataExtractor for MediaInfoCli {
    async fn extract(&self, path: &Path) -> Result<Vec<Track>> {
        let stdout = self.run(path).await?;
        let tracks = parse_mediainfo_json(&stdout)?;
        tracing::debug!("{} reported {} tracks", self.binary, tracks.len());
        Ok(tracks)
    }

    async fn is_available(&self) -> bool {
        self.version().await.is_some()
    }

    async fn version(&self) -> Option<String> {
        let output = Command::new(&self.binary)
            .arg("--Version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(Duration::from_secs(10), output)
            .await
            .ok()?
            .ok()?;

        if !output.status.success() {
            return None;
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(|line| line.to_string())
    }

    fn name(&self) -> &'static str {
        "mediainfo"
    }
}

/// Parse `mediainfo --Output=JSON` output into normalized tracks
pub fn parse_mediainfo_json(raw: &[u8]) -> Result<Vec<Track>> {
    let output: MediaInfoOutput = serde_json::from_slice(raw).map_err(|e| {
        MediaInfoError::AnalysisFailed(format!("unreadable mediainfo output: {}", e))
    })?;

    let Some(media) = output.media else {
        // mediainfo prints `"media": null` for files it cannot open
        return Err(MediaInfoError::AnalysisFailed(
            "mediainfo did not recognize the sample".to_string(),
        )
        .into());
    };

    let raw_tracks = match media.track {
        Value::Array(tracks) => tracks,
        Value::Object(track) => vec![Value::Object(track)],
        _ => Vec::new(),
    };

    Ok(raw_tracks
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(normalize_track(map)),
            _ => None,
        })
        .collect())
}

fn normalize_track(raw: Map<String, Value>) -> Track {
    let kind = raw
        .get("@type")
        .and_then(Value::as_str)
        .map(TrackKind::from)
        .unwrap_or_else(|| TrackKind::Other("Other".to_string()));

    let mut track = Track::new(kind);

    for (key, value) in raw {
        match key.as_str() {
            "@type" | "@typeorder" => {}
            "ID" => track.id = scalar_to_string(&value),
            "Duration" => {
                track.fields.insert("duration".to_string(), seconds_to_millis(value));
            }
            "extra" => {
                track.fields.insert("extra".to_string(), value);
            }
            _ => {
                track.fields.insert(canonical_field_name(&key), value);
            }
        }
    }

    track
}

/// Map a MediaInfo JSON key to its canonical snake_case field name
pub fn canonical_field_name(key: &str) -> String {
    if let Some((_, renamed)) = RENAMED_FIELDS.iter().find(|(from, _)| *from == key) {
        return renamed.to_string();
    }

    let mut name = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if matches!(prev, Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit()) {
                name.push('_');
            }
            name.push(c.to_ascii_lowercase());
        } else if c == '_' || c == '-' || c == ' ' {
            if !name.ends_with('_') {
                name.push('_');
            }
        } else {
            name.push(c);
        }
        prev = Some(c);
    }

    name.trim_matches('_').to_string()
}

fn seconds_to_millis(value: Value) -> Value {
    let seconds = match &value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match seconds {
        Some(s) if s.is_finite() => Value::from((s * 1000.0).round() as i64),
        _ => value,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
