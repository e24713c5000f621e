//! Caption Formatter: word timings to SRT.

use serde::{Deserialize, Serialize};

/// One word's offset within the synthesized audio, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl WordTiming {
    pub fn new(word: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            word: word.into(),
            start_time,
            end_time,
        }
    }
}

const MAX_TIMESTAMP_MICROS: u64 = 999_999 * 3_600_000_000 + 3_599_999_000;

/// Formats seconds as `HH:MM:SS,mmm`.
///
/// The value is resolved to whole microseconds first and milliseconds are then truncated,
/// so `3661.999` prints as `01:01:01,999` and never rounds up into the next second.
/// Negative and NaN inputs print as zero. Anything past `999999:59:59,999`, infinity included,
/// prints as that ceiling.
pub fn format_timestamp(seconds: f64) -> String {
    let micros = if seconds.is_nan() || seconds <= 0.0 {
        0
    } else {
        (seconds * 1_000_000.0).round().min(MAX_TIMESTAMP_MICROS as f64) as u64
    };

    let total_secs = micros / 1_000_000;
    let millis = (micros % 1_000_000) / 1_000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Renders one numbered block per timing, in input order.
///
/// Overlapping entries are emitted as-is. Every block, including the last, ends with a blank
/// line; an empty slice yields an empty string.
pub fn to_srt(timings: &[WordTiming]) -> String {
    let mut out = String::new();
    for (i, t) in timings.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(t.start_time),
            format_timestamp(t.end_time),
            t.word
        ));
    }
    out
}
