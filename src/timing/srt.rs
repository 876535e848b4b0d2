use super::reconciler::SubtitleTimestamp;
use std::fmt::Write;

fn format_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        ms
    )
}

/// Render timestamps as SubRip cues, numbered from 1
pub fn to_srt(timestamps: &[SubtitleTimestamp]) -> String {
    let mut out = String::new();

    for (i, ts) in timestamps.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_time(ts.start_time),
            format_time(ts.end_time),
            ts.text
        );
    }

    out
}
