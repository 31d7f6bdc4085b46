//! Unit conversions used by the reports.
//!
//! Every function here is total: input that is missing, null, non-numeric or out of range
//! yields [`UNKNOWN`] (or `None` for flags) instead of an error.

use serde_json::Value;

pub const UNKNOWN: &str = "Unknown";

const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Interpret a raw field value as a number
///
/// Accepts JSON numbers and numeric strings; anything else is `None`.
pub fn numeric(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

/// Format byte counts with base-1024 units, e.g. `"1.5 KB"`
pub fn readable_bytes(value: Option<&Value>) -> String {
    match numeric(value) {
        Some(bytes) if bytes == 0.0 => "0B".to_string(),
        Some(bytes) if bytes > 0.0 => readable_bytes_u64(bytes.floor() as u64),
        _ => UNKNOWN.to_string(),
    }
}

pub fn readable_bytes_u64(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    format!("{} {}", decimal(scaled), SIZE_UNITS[unit])
}

/// Round to two places and print without padding zeros, keeping one decimal
fn decimal(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Format bits per second, e.g. `"4.5 Mbps"`
pub fn readable_bitrate(value: Option<&Value>) -> String {
    match numeric(value) {
        Some(bps) if bps > 0.0 && bps < 1_000.0 => format!("{} bps", bps as u64),
        Some(bps) if bps >= 1_000.0 && bps < 1_000_000.0 => format!("{:.1} Kbps", bps / 1_000.0),
        Some(bps) if bps >= 1_000_000.0 => format!("{:.1} Mbps", bps / 1_000_000.0),
        _ => UNKNOWN.to_string(),
    }
}

/// Whole hours, minutes and seconds of a millisecond duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationParts {
    pub fn from_millis(millis: u64) -> Self {
        let total_seconds = millis / 1000;
        Self {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
        }
    }
}

/// Format a millisecond duration the way MediaInfo does, e.g. `"1 h 35 min"`
pub fn format_duration(value: Option<&Value>) -> String {
    let millis = match numeric(value) {
        Some(ms) if ms > 0.0 => ms as u64,
        _ => return UNKNOWN.to_string(),
    };

    let DurationParts { hours, minutes, seconds } = DurationParts::from_millis(millis);

    if hours > 0 {
        if minutes > 0 {
            format!("{} h {} min", hours, minutes)
        } else {
            format!("{} h", hours)
        }
    } else if minutes > 0 {
        if seconds > 0 {
            format!("{} min {} s", minutes, seconds)
        } else {
            format!("{} min", minutes)
        }
    } else {
        format!("{} s", seconds)
    }
}

/// Format a frame rate, naming the NTSC rates
pub fn format_frame_rate(value: Option<&Value>) -> String {
    match numeric(value) {
        Some(fps) if (fps - 23.976).abs() < 0.01 => "23.976 (24000/1001) FPS".to_string(),
        Some(fps) if (fps - 29.97).abs() < 0.01 => "29.970 (30000/1001) FPS".to_string(),
        Some(fps) if fps > 0.0 => format!("{:.3} FPS", fps),
        _ => UNKNOWN.to_string(),
    }
}

/// Group thousands with spaces, e.g. `"1 920"`
pub fn format_pixels(value: Option<&Value>) -> String {
    match numeric(value) {
        Some(px) if px >= 0.0 => group_digits(px as u64),
        _ => UNKNOWN.to_string(),
    }
}

pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    grouped
}

/// Interpret yes/no style flags; `None` means the field should not be shown
pub fn format_flag(value: Option<&Value>) -> Option<&'static str> {
    match value? {
        Value::Bool(true) => Some("Yes"),
        Value::Bool(false) => Some("No"),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some("Yes"),
            Some(v) if v == 0.0 => Some("No"),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "yes" | "1" | "true" => Some("Yes"),
            "no" | "0" | "false" => Some("No"),
            _ => None,
        },
        _ => None,
    }
}

/// Format a sampling rate in Hz, e.g. `"48.0 kHz"`
pub fn format_sampling_rate(value: Option<&Value>) -> String {
    match numeric(value) {
        Some(hz) if hz >= 1000.0 => format!("{:.1} kHz", hz / 1000.0),
        Some(hz) if hz > 0.0 => format!("{} Hz", hz.round() as u64),
        _ => UNKNOWN.to_string(),
    }
}

const NAMED_RATIOS: &[(f64, &str)] = &[
    (16.0 / 9.0, "16:9"),
    (4.0 / 3.0, "4:3"),
    (21.0 / 9.0, "21:9"),
    (1.0, "1:1"),
];

/// Format a display aspect ratio, naming the common ones
pub fn format_aspect_ratio(value: Option<&Value>) -> String {
    match numeric(value) {
        Some(ratio) if ratio > 0.0 => named_ratio(ratio),
        Some(_) => UNKNOWN.to_string(),
        None => match value {
            // Already a display string such as "16:9"
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => UNKNOWN.to_string(),
        },
    }
}

/// Aspect ratio derived from pixel dimensions
pub fn aspect_ratio_from_dimensions(width: Option<&Value>, height: Option<&Value>) -> Option<String> {
    let width = numeric(width).filter(|w| *w > 0.0)?;
    let height = numeric(height).filter(|h| *h > 0.0)?;
    Some(named_ratio(width / height))
}

fn named_ratio(ratio: f64) -> String {
    NAMED_RATIOS
        .iter()
        .find(|(known, _)| (ratio - known).abs() < 0.01)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("{:.3}", ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: Value) -> Option<Value> {
        Some(value)
    }

    #[test]
    fn test_readable_bytes() {
        assert_eq!(readable_bytes(v(json!(0)).as_ref()), "0B");
        assert_eq!(readable_bytes(v(json!(512)).as_ref()), "512.0 B");
        assert_eq!(readable_bytes(v(json!(1024)).as_ref()), "1.0 KB");
        assert_eq!(readable_bytes(v(json!("1536")).as_ref()), "1.5 KB");
        assert_eq!(readable_bytes(v(json!(1_048_576)).as_ref()), "1.0 MB");
        assert_eq!(readable_bytes(v(json!(1_288_490_189u64)).as_ref()), "1.2 GB");
        assert_eq!(readable_bytes(v(json!(5_000_000)).as_ref()), "4.77 MB");
        assert_eq!(readable_bytes_u64(1024u64.pow(5) * 3), "3072.0 TB");
    }

    #[test]
    fn test_readable_bytes_unknown() {
        assert_eq!(readable_bytes(None), UNKNOWN);
        assert_eq!(readable_bytes(v(Value::Null).as_ref()), UNKNOWN);
        assert_eq!(readable_bytes(v(json!(-5)).as_ref()), UNKNOWN);
        assert_eq!(readable_bytes(v(json!("lots")).as_ref()), UNKNOWN);
        assert_eq!(readable_bytes(v(json!(true)).as_ref()), UNKNOWN);
    }

    #[test]
    fn test_readable_bytes_unit_is_unique() {
        for bytes in [1u64, 1023, 1024, 1025, 999_999, 1 << 20, (1 << 30) + 17, 1 << 40] {
            let rendered = readable_bytes_u64(bytes);
            let (number, unit) = rendered.split_once(' ').unwrap();
            let number: f64 = number.parse().unwrap();
            assert!(number >= 1.0 && number <= 1024.0, "{} -> {}", bytes, rendered);
            assert!(SIZE_UNITS.contains(&unit));
        }
    }

    #[test]
    fn test_readable_bitrate_bands() {
        assert_eq!(readable_bitrate(v(json!(999)).as_ref()), "999 bps");
        assert_eq!(readable_bitrate(v(json!(1000)).as_ref()), "1.0 Kbps");
        assert_eq!(readable_bitrate(v(json!("128000")).as_ref()), "128.0 Kbps");
        assert_eq!(readable_bitrate(v(json!(999_999)).as_ref()), "1000.0 Kbps");
        assert_eq!(readable_bitrate(v(json!(1_000_000)).as_ref()), "1.0 Mbps");
        assert_eq!(readable_bitrate(v(json!(4_500_000.0)).as_ref()), "4.5 Mbps");
        assert_eq!(readable_bitrate(v(json!(0)).as_ref()), UNKNOWN);
        assert_eq!(readable_bitrate(v(json!(-1)).as_ref()), UNKNOWN);
        assert_eq!(readable_bitrate(None), UNKNOWN);
    }

    #[test]
    fn test_readable_bitrate_is_monotonic_within_band() {
        let values: Vec<f64> = (1..200)
            .map(|i| i as f64 * 5_000.0)
            .map(|b| readable_bitrate(Some(&json!(b))))
            .map(|s| s.trim_end_matches(" Kbps").parse::<f64>().unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(v(json!(12_000)).as_ref()), "12 s");
        assert_eq!(format_duration(v(json!(500)).as_ref()), "0 s");
        assert_eq!(format_duration(v(json!(2_712_000)).as_ref()), "45 min 12 s");
        assert_eq!(format_duration(v(json!(2_700_000)).as_ref()), "45 min");
        assert_eq!(format_duration(v(json!("5700000")).as_ref()), "1 h 35 min");
        assert_eq!(format_duration(v(json!(3_600_000)).as_ref()), "1 h");
        assert_eq!(format_duration(v(json!(0)).as_ref()), UNKNOWN);
        assert_eq!(format_duration(v(json!("abc")).as_ref()), UNKNOWN);
        assert_eq!(format_duration(None), UNKNOWN);
    }

    #[test]
    fn test_duration_parts_match_integer_division() {
        for ms in [0u64, 999, 1_000, 59_999, 61_001, 3_599_999, 3_600_000, 86_399_999, 123_456_789] {
            let parts = DurationParts::from_millis(ms);
            let secs = ms / 1000;
            assert_eq!(parts.hours, secs / 3600);
            assert_eq!(parts.minutes, (secs % 3600) / 60);
            assert_eq!(parts.seconds, secs % 60);
        }
    }

    #[test]
    fn test_format_frame_rate() {
        assert_eq!(format_frame_rate(v(json!("23.976")).as_ref()), "23.976 (24000/1001) FPS");
        assert_eq!(format_frame_rate(v(json!(23.98)).as_ref()), "23.976 (24000/1001) FPS");
        assert_eq!(format_frame_rate(v(json!(29.97)).as_ref()), "29.970 (30000/1001) FPS");
        assert_eq!(format_frame_rate(v(json!(25)).as_ref()), "25.000 FPS");
        assert_eq!(format_frame_rate(v(json!("Variable")).as_ref()), UNKNOWN);
        assert_eq!(format_frame_rate(None), UNKNOWN);
    }

    #[test]
    fn test_format_pixels() {
        assert_eq!(format_pixels(v(json!(1920)).as_ref()), "1 920");
        assert_eq!(format_pixels(v(json!("720")).as_ref()), "720");
        assert_eq!(format_pixels(v(json!(3840)).as_ref()), "3 840");
        assert_eq!(group_digits(1_234_567), "1 234 567");
        assert_eq!(group_digits(0), "0");
        assert_eq!(format_pixels(v(json!("wide")).as_ref()), UNKNOWN);
    }

    #[test]
    fn test_format_flag() {
        for yes in ["yes", "1", "true", "Yes", "TRUE", " yes "] {
            assert_eq!(format_flag(v(json!(yes)).as_ref()), Some("Yes"), "{}", yes);
        }
        for no in ["no", "0", "false", "No"] {
            assert_eq!(format_flag(v(json!(no)).as_ref()), Some("No"), "{}", no);
        }
        assert_eq!(format_flag(v(json!(true)).as_ref()), Some("Yes"));
        assert_eq!(format_flag(v(json!(0)).as_ref()), Some("No"));
        assert_eq!(format_flag(v(json!(1)).as_ref()), Some("Yes"));
        assert_eq!(format_flag(v(json!(2)).as_ref()), None);
        assert_eq!(format_flag(v(json!("")).as_ref()), None);
        assert_eq!(format_flag(v(json!("maybe")).as_ref()), None);
        assert_eq!(format_flag(v(Value::Null).as_ref()), None);
        assert_eq!(format_flag(None), None);
    }

    #[test]
    fn test_format_sampling_rate() {
        assert_eq!(format_sampling_rate(v(json!("48000")).as_ref()), "48.0 kHz");
        assert_eq!(format_sampling_rate(v(json!(44100)).as_ref()), "44.1 kHz");
        assert_eq!(format_sampling_rate(v(json!(800)).as_ref()), "800 Hz");
        assert_eq!(format_sampling_rate(v(json!("x")).as_ref()), UNKNOWN);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(format_aspect_ratio(v(json!("1.778")).as_ref()), "16:9");
        assert_eq!(format_aspect_ratio(v(json!(1.333)).as_ref()), "4:3");
        assert_eq!(format_aspect_ratio(v(json!("2.400")).as_ref()), "2.400");
        assert_eq!(format_aspect_ratio(v(json!("16:9")).as_ref()), "16:9");
        assert_eq!(format_aspect_ratio(None), UNKNOWN);
        assert_eq!(
            aspect_ratio_from_dimensions(Some(&json!(1920)), Some(&json!("1080"))),
            Some("16:9".to_string())
        );
        assert_eq!(
            aspect_ratio_from_dimensions(Some(&json!(1998)), Some(&json!(1080))),
            Some("1.850".to_string())
        );
        assert_eq!(aspect_ratio_from_dimensions(Some(&json!(0)), Some(&json!(1080))), None);
    }
}
