//! MediaInfo style text report.
//!
//! Each track kind has a fixed table of fields; values are formatted by kind and fields
//! that are absent or empty are skipped. Repeated kinds are numbered (`Audio #2`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use super::formatters::*;
use super::ReportContext;
use crate::extract::{Track, TrackKind};

const LABEL_WIDTH: usize = 41;

/// Menu keys like `_00_01_30_000` are chapter timestamps
static CHAPTER_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^_?(\d{2})_(\d{2})_(\d{2})_?(\d{3})$").expect("Failed to compile chapter key regex")
});

/// How a field value is rendered
#[derive(Debug, Clone, Copy)]
enum Style {
    Plain,
    Suffix(&'static str),
    Bytes,
    Bitrate,
    Duration,
    FrameRate,
    Pixels,
    AspectRatio,
    SamplingRate,
    Flag,
}

struct Field {
    label: &'static str,
    key: &'static str,
    style: Style,
}

const fn field(label: &'static str, key: &'static str, style: Style) -> Field {
    Field { label, key, style }
}

const GENERAL_FIELDS: &[Field] = &[
    field("Format", "format", Style::Plain),
    field("Format version", "format_version", Style::Plain),
    field("File size", "file_size", Style::Bytes),
    field("Duration", "duration", Style::Duration),
    field("Overall bit rate mode", "overall_bit_rate_mode", Style::Plain),
    field("Overall bit rate", "overall_bit_rate", Style::Bitrate),
    field("Frame rate", "frame_rate", Style::FrameRate),
    field("Title", "title", Style::Plain),
    field("Encoded date", "encoded_date", Style::Plain),
    field("Writing application", "writing_application", Style::Plain),
    field("Writing library", "writing_library", Style::Plain),
];

const VIDEO_FIELDS: &[Field] = &[
    field("Format", "format", Style::Plain),
    field("Format/Info", "format_info", Style::Plain),
    field("Format profile", "format_profile", Style::Plain),
    field("Format settings", "format_settings", Style::Plain),
    field("Codec ID", "codec_id", Style::Plain),
    field("Duration", "duration", Style::Duration),
    field("Bit rate mode", "bit_rate_mode", Style::Plain),
    field("Bit rate", "bit_rate", Style::Bitrate),
    field("Width", "width", Style::Pixels),
    field("Height", "height", Style::Pixels),
    field("Display aspect ratio", "display_aspect_ratio", Style::AspectRatio),
    field("Frame rate mode", "frame_rate_mode", Style::Plain),
    field("Frame rate", "frame_rate", Style::FrameRate),
    field("Color space", "color_space", Style::Plain),
    field("Chroma subsampling", "chroma_subsampling", Style::Plain),
    field("Bit depth", "bit_depth", Style::Suffix(" bits")),
    field("Scan type", "scan_type", Style::Plain),
    field("Stream size", "stream_size", Style::Bytes),
    field("Title", "title", Style::Plain),
    field("Language", "language", Style::Plain),
    field("Default", "default", Style::Flag),
    field("Forced", "forced", Style::Flag),
];

const AUDIO_FIELDS: &[Field] = &[
    field("Format", "format", Style::Plain),
    field("Format/Info", "format_info", Style::Plain),
    field("Commercial name", "commercial_name", Style::Plain),
    field("Codec ID", "codec_id", Style::Plain),
    field("Duration", "duration", Style::Duration),
    field("Bit rate mode", "bit_rate_mode", Style::Plain),
    field("Bit rate", "bit_rate", Style::Bitrate),
    field("Channel(s)", "channel_s", Style::Suffix(" channels")),
    field("Channel layout", "channel_layout", Style::Plain),
    field("Sampling rate", "sampling_rate", Style::SamplingRate),
    field("Frame rate", "frame_rate", Style::Suffix(" FPS")),
    field("Compression mode", "compression_mode", Style::Plain),
    field("Stream size", "stream_size", Style::Bytes),
    field("Title", "title", Style::Plain),
    field("Language", "language", Style::Plain),
    field("Default", "default", Style::Flag),
    field("Forced", "forced", Style::Flag),
];

const TEXT_FIELDS: &[Field] = &[
    field("Format", "format", Style::Plain),
    field("Codec ID", "codec_id", Style::Plain),
    field("Codec ID/Info", "codec_id_info", Style::Plain),
    field("Duration", "duration", Style::Duration),
    field("Bit rate", "bit_rate", Style::Bitrate),
    field("Frame rate", "frame_rate", Style::Suffix(" FPS")),
    field("Count of elements", "count_of_elements", Style::Plain),
    field("Stream size", "stream_size", Style::Bytes),
    field("Title", "title", Style::Plain),
    field("Language", "language", Style::Plain),
    field("Default", "default", Style::Flag),
    field("Forced", "forced", Style::Flag),
];

const OTHER_FIELDS: &[Field] = &[
    field("Type", "type", Style::Plain),
    field("Format", "format", Style::Plain),
    field("Duration", "duration", Style::Duration),
    field("Stream size", "stream_size", Style::Bytes),
    field("Title", "title", Style::Plain),
    field("Language", "language", Style::Plain),
];

/// Render the full report
pub fn format_as_text(context: &ReportContext, tracks: &[Track]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let totals = count_kinds(tracks);
    let mut seen: HashMap<&TrackKind, usize> = HashMap::new();

    for track in tracks {
        let index = seen.entry(&track.kind).or_insert(0);
        *index += 1;

        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(section_title(&track.kind, *index, totals[&track.kind]));

        match &track.kind {
            TrackKind::General => general_section(&mut lines, context, track),
            TrackKind::Video => field_section(&mut lines, track, VIDEO_FIELDS),
            TrackKind::Audio => field_section(&mut lines, track, AUDIO_FIELDS),
            TrackKind::Text => field_section(&mut lines, track, TEXT_FIELDS),
            TrackKind::Menu => menu_section(&mut lines, track),
            TrackKind::Other(_) => field_section(&mut lines, track, OTHER_FIELDS),
        }
    }

    if lines.is_empty() {
        lines.push("General".to_string());
        lines.push(line("Complete name", &context.filename));
        if let Some(length) = context.declared_length {
            lines.push(line("File size", &readable_bytes_u64(length)));
        }
    }

    lines.join("\n")
}

fn count_kinds(tracks: &[Track]) -> HashMap<&TrackKind, usize> {
    let mut totals = HashMap::new();
    for track in tracks {
        *totals.entry(&track.kind).or_insert(0) += 1;
    }
    totals
}

/// `Audio` for the first track of a kind, `Audio #2` from the second on
fn section_title(kind: &TrackKind, index: usize, total: usize) -> String {
    if index > 1 || (total > 1 && *kind == TrackKind::General) {
        format!("{} #{}", kind, index)
    } else {
        kind.to_string()
    }
}

fn line(label: &str, value: &str) -> String {
    format!("{:<width$}: {}", label, value, width = LABEL_WIDTH)
}

fn general_section(lines: &mut Vec<String>, context: &ReportContext, track: &Track) {
    if let Some(unique_id) = track.text("unique_id") {
        lines.push(line("Unique ID", &unique_id));
    }
    lines.push(line("Complete name", &context.filename));

    for field in GENERAL_FIELDS {
        // The origin's declared size describes the whole file, the tool only saw a sample
        if field.key == "file_size" {
            if let Some(length) = context.declared_length {
                lines.push(line(field.label, &readable_bytes_u64(length)));
                continue;
            }
        }
        if let Some(value) = render_field(track, field) {
            lines.push(line(field.label, &value));
        }
    }
}

fn field_section(lines: &mut Vec<String>, track: &Track, fields: &[Field]) {
    if let Some(id) = &track.id {
        lines.push(line("ID", id));
    }

    for field in fields {
        if let Some(value) = render_field(track, field) {
            lines.push(line(field.label, &value));
        }
    }
}

fn render_field(track: &Track, field: &Field) -> Option<String> {
    let raw = track.get(field.key);
    let text = track.text(field.key);

    match field.style {
        Style::Flag => format_flag(raw).map(str::to_string),
        Style::AspectRatio => match text {
            Some(_) => Some(format_aspect_ratio(raw)),
            None => aspect_ratio_from_dimensions(track.get("width"), track.get("height")),
        },
        Style::Plain => text,
        Style::Suffix(suffix) => text.map(|text| format!("{}{}", text, suffix)),
        Style::Bytes => text.map(|_| readable_bytes(raw)),
        Style::Bitrate => text.map(|_| readable_bitrate(raw)),
        Style::Duration => text.map(|_| format_duration(raw)),
        Style::FrameRate => text.map(|_| format_frame_rate(raw)),
        Style::Pixels => text.map(|_| format!("{} pixels", format_pixels(raw))),
        Style::SamplingRate => text.map(|_| format_sampling_rate(raw)),
    }
}

fn menu_section(lines: &mut Vec<String>, track: &Track) {
    let mut entries: Vec<(&String, &Value)> = track.fields.iter().collect();
    if let Some(Value::Object(extra)) = track.get("extra") {
        entries.extend(extra.iter());
    }

    for (key, value) in entries {
        let Some(text) = value.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };

        if let Some(caps) = CHAPTER_KEY.captures(key) {
            let timestamp = format!("{}:{}:{}.{}", &caps[1], &caps[2], &caps[3], &caps[4]);
            lines.push(line(&timestamp, text));
        } else if text.to_lowercase().contains("chapter") {
            lines.push(line(key, text));
        }
    }
}
