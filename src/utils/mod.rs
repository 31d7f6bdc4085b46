use url::Url;

use crate::{MediaInfoError, Result};

/// Fallback display name when the URL path has no usable file name
pub const DEFAULT_FILENAME: &str = "media_file";

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| MediaInfoError::InvalidSourceUrl(format!("Invalid URL format: {}", url)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MediaInfoError::InvalidSourceUrl(
            "URL must use HTTP or HTTPS protocol".to_string(),
        )
        .into());
    }

    Ok(parsed.to_string())
}

/// Derive a display file name from the last path segment of a URL
pub fn filename_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.last().map(|s| s.to_string()))
        })
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(&segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or(segment)
        })
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Pull the file name out of a `Content-Disposition` header value
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    // RFC 5987 form takes precedence: filename*=UTF-8''name%20here.mkv
    for part in header.split(';').map(str::trim) {
        if let Some(value) = part.strip_prefix("filename*=") {
            let encoded = value.rsplit("''").next().unwrap_or(value).trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded) {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        }
    }

    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|value| value.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Extract domain from URL for display purposes
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
}
