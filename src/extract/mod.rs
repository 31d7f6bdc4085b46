use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub mod mediainfo;

use crate::Result;

/// Kind of stream or section reported by the analysis tool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrackKind {
    General,
    Video,
    Audio,
    Text,
    Menu,
    Other(String),
}

impl TrackKind {
    pub fn as_str(&self) -> &str {
        match self {
            TrackKind::General => "General",
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Text => "Text",
            TrackKind::Menu => "Menu",
            TrackKind::Other(name) => name,
        }
    }
}

impl From<&str> for TrackKind {
    fn from(value: &str) -> Self {
        match value.trim() {
            "General" => TrackKind::General,
            "Video" => TrackKind::Video,
            "Audio" => TrackKind::Audio,
            "Text" => TrackKind::Text,
            "Menu" => TrackKind::Menu,
            "" => TrackKind::Other("Other".to_string()),
            other => TrackKind::Other(other.to_string()),
        }
    }
}

impl From<String> for TrackKind {
    fn from(value: String) -> Self {
        TrackKind::from(value.as_str())
    }
}

impl From<TrackKind> for String {
    fn from(kind: TrackKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stream or logical section of a media file
///
/// Field names are canonical snake_case keys (`bit_rate`, `channel_s`, ...) and values are
/// whatever the tool reported; durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub kind: TrackKind,
    pub id: Option<String>,
    pub fields: Map<String, Value>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            id: None,
            fields: Map::new(),
        }
    }

    /// Builder-style helper to set a field
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Raw value of a field, treating JSON null as absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    /// Field rendered as display text; empty strings, zero and `false` count as absent
    pub fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(false) => None,
            Value::Bool(true) => Some("true".to_string()),
            Value::Array(_) | Value::Object(_) => None,
            Value::Null => None,
        }
    }
}

/// Trait for the external tool that turns a sample into a track list
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Analyze the file at `path`
    async fn extract(&self, path: &Path) -> Result<Vec<Track>>;

    /// Check whether the tool can be invoked
    async fn is_available(&self) -> bool;

    /// Version string reported by the tool, if any
    async fn version(&self) -> Option<String>;

    /// Name of the tool
    fn name(&self) -> &'static str;
}
