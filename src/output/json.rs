use serde_json::{json, Map, Value};

use super::formatters::{readable_bytes_u64, UNKNOWN};
use super::{ReportContext, API_VERSION};
use crate::extract::Track;

/// Build the JSON document for a set of tracks
pub fn format_as_json(context: &ReportContext, tracks: &[Track]) -> Value {
    let file_size = context
        .declared_length
        .map(readable_bytes_u64)
        .unwrap_or_else(|| UNKNOWN.to_string());

    json!({
        "filename": context.filename,
        "file_size": file_size,
        "sample_size": readable_bytes_u64(context.sample_length),
        "tracks": tracks.iter().map(track_to_json).collect::<Vec<_>>(),
        "api_version": API_VERSION,
    })
}

/// Track type and id first, then every non-null field as reported
fn track_to_json(track: &Track) -> Value {
    let mut object = Map::new();
    object.insert("track_type".to_string(), Value::from(track.kind.as_str()));
    object.insert(
        "track_id".to_string(),
        track.id.clone().map(Value::from).unwrap_or(Value::Null),
    );

    for (name, value) in &track.fields {
        if value.is_null() || name == "track_type" || name == "track_id" {
            continue;
        }
        object.insert(name.clone(), value.clone());
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TrackKind;

    #[test]
    fn test_document_shape() {
        let context = ReportContext {
            filename: "movie.mkv".to_string(),
            declared_length: Some(1_073_741_824),
            sample_length: 10 * 1024 * 1024,
        };
        let tracks = vec![
            Track::new(TrackKind::General).with_field("format", "Matroska"),
            Track::new(TrackKind::Audio)
                .with_id("2")
                .with_field("channel_s", "6")
                .with_field("title", Value::Null)
                .with_field("extra", json!({"source": "x"})),
        ];

        let doc = format_as_json(&context, &tracks);

        assert_eq!(doc["filename"], "movie.mkv");
        assert_eq!(doc["file_size"], "1.0 GB");
        assert_eq!(doc["sample_size"], "10.0 MB");
        assert_eq!(doc["tracks"][0]["track_type"], "General");
        assert_eq!(doc["tracks"][0]["track_id"], Value::Null);
        assert_eq!(doc["tracks"][1]["track_id"], "2");
        assert_eq!(doc["tracks"][1]["channel_s"], "6");
        assert_eq!(doc["tracks"][1]["extra"]["source"], "x");
        assert!(doc["tracks"][1].get("title").is_none());

        let keys: Vec<_> = doc["tracks"][1].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys[..2], ["track_type".to_string(), "track_id".to_string()]);
    }

    #[test]
    fn test_unknown_file_size() {
        let context = ReportContext {
            filename: "media_file".to_string(),
            declared_length: None,
            sample_length: 0,
        };
        let doc = format_as_json(&context, &[]);
        assert_eq!(doc["file_size"], UNKNOWN);
        assert_eq!(doc["sample_size"], "0B");
        assert_eq!(doc["tracks"], json!([]));
    }
}
