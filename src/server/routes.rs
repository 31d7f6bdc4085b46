use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::output::readable_bytes_u64;
use crate::service::SourceRequest;
use crate::MediaInfoError;

use super::AppState;

const USAGE: &str = "GET /?url=<media_url>&format=<json|text>";

/// Error envelope returned to clients
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    url: Option<String>,
}

impl ApiError {
    /// 400 for a request without a usable `url`
    pub fn missing_parameter(name: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: MediaInfoError::MissingParameter(name).to_string(),
            url: None,
        }
    }

    /// 400 for a query string that does not deserialize
    pub fn bad_query(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid query string: {}", rejection.body_text()),
            url: None,
        }
    }

    /// Map a pipeline failure to its status and message
    pub fn from_failure(err: &anyhow::Error, url: &str) -> Self {
        let status = match err.downcast_ref::<MediaInfoError>() {
            Some(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            message: format!("Processing failed: {err:#}"),
            url: Some(url.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.url {
            Some(url) => json!({ "error": self.message, "url": url }),
            None if self.status == StatusCode::BAD_REQUEST => {
                json!({ "error": self.message, "usage": USAGE })
            }
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ── GET /?url=X[&format=json|text] ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct AnalyzeParams {
    pub url: Option<String>,
    pub format: Option<String>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyzeParams>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => return ApiError::bad_query(rejection).into_response(),
    };

    let Some(url) = params.url else {
        return Json(usage_document(&state)).into_response();
    };

    let url = url.trim().to_string();
    if url.is_empty() {
        return ApiError::missing_parameter("url").into_response();
    }

    let default_format = state.config.app.default_output_format;
    let format = match params.format.as_deref() {
        None => default_format,
        Some(raw) => OutputFormat::parse_lenient(raw).unwrap_or_else(|| {
            tracing::debug!("Unknown format {raw:?}, using {default_format}");
            default_format
        }),
    };

    let request = SourceRequest::new(url, format);
    let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4());

    async {
        tracing::info!("Analyzing {} as {}", request.url, request.format);
        match state.pipeline.analyze(&request).await {
            Ok(presentation) => presentation.into_response(),
            Err(e) => {
                tracing::error!("analyze: {e:#}");
                ApiError::from_failure(&e, &request.url).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

fn usage_document(state: &AppState) -> serde_json::Value {
    let default_format = state.config.app.default_output_format;
    json!({
        "message": "MediaInfo API",
        "status": "online",
        "usage": USAGE,
        "examples": {
            "text_format": "/?url=https://example.com/video.mp4&format=text",
            "json_format": "/?url=https://example.com/video.mp4&format=json",
            "gdrive_link": "/?url=https://drive.google.com/file/d/FILE_ID/view&format=text",
        },
        "note": format!("Default format is '{default_format}'"),
    })
}

// ── GET /health ──────────────────────────────────────────────────────────────

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let extractor = state.pipeline.extractor();

    match extractor.version().await {
        Some(version) => Json(json!({
            "status": "healthy",
            "service": "mediainfo-api",
            "mediainfo_available": true,
            "version": version,
        }))
        .into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "error": format!("{} could not be invoked", extractor.name()),
                "mediainfo_available": false,
            })),
        )
            .into_response(),
    }
}

// ── GET /info ────────────────────────────────────────────────────────────────

pub async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let platforms = state.pipeline.resolvers().list_platforms();

    Json(json!({
        "api_name": "MediaInfo API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Extract detailed media information from video and audio files",
        "endpoints": {
            "/": "Main MediaInfo analysis endpoint",
            "/health": "Health check",
            "/info": "API information",
        },
        "supported_url_types": platforms,
        "output_formats": ["json", "text"],
        "default_format": state.config.app.default_output_format,
        "max_sample_size": readable_bytes_u64(state.pipeline.max_sample_bytes()),
        "download_timeout_secs": state.config.sampler.timeout_secs,
    }))
}
