use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::extract::Track;

pub mod formatters;
pub mod json;
pub mod text;

pub use formatters::*;

/// Version tag reported in JSON documents
pub const API_VERSION: &str = concat!("MediaInfo API v", env!("CARGO_PKG_VERSION"));

/// Facts about the sampled file that do not come from the analysis tool
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    /// Display name of the file
    pub filename: String,

    /// Total size announced by the origin
    pub declared_length: Option<u64>,

    /// Bytes actually analyzed
    pub sample_length: u64,
}

/// A rendered analysis result
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Json(serde_json::Value),
    Text(String),
}

impl Presentation {
    /// Render tracks in the requested format
    pub fn render(context: &ReportContext, tracks: &[Track], format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Presentation::Json(json::format_as_json(context, tracks)),
            OutputFormat::Text => Presentation::Text(text::format_as_text(context, tracks)),
        }
    }

    /// Body as a string, pretty-printing JSON
    pub fn to_body(&self) -> String {
        match self {
            Presentation::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Presentation::Text(text) => text.clone(),
        }
    }
}

impl IntoResponse for Presentation {
    fn into_response(self) -> Response {
        match self {
            Presentation::Json(value) => Json(value).into_response(),
            Presentation::Text(text) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                text,
            )
                .into_response(),
        }
    }
}
