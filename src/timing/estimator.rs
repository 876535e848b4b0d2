/// Seconds per CJK ideograph
const SECONDS_PER_CJK_CHAR: f64 = 0.4;

/// Seconds per whitespace-delimited non-CJK word
const SECONDS_PER_WORD: f64 = 0.3;

/// Pause buffer added per character, capped at `MAX_PAUSE_BUFFER`
const PAUSE_PER_CHAR: f64 = 0.01;
const MAX_PAUSE_BUFFER: f64 = 2.0;

const MIN_ESTIMATE: f64 = 1.0;

pub fn is_cjk_ideograph(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'   // Unified Ideographs
        | '\u{3400}'..='\u{4DBF}' // Extension A
        | '\u{F900}'..='\u{FAFF}' // Compatibility Ideographs
    )
}

/// Heuristic speaking time of `text` in seconds
///
/// Empty text is exactly 0.0; anything else is at least one second.
pub fn estimate(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let cjk_count = text.chars().filter(|&c| is_cjk_ideograph(c)).count();
    let word_count = text
        .split_whitespace()
        .filter(|token| !token.chars().any(is_cjk_ideograph))
        .count();

    let base = cjk_count as f64 * SECONDS_PER_CJK_CHAR + word_count as f64 * SECONDS_PER_WORD;
    let buffer = (text.chars().count() as f64 * PAUSE_PER_CHAR).min(MAX_PAUSE_BUFFER);

    (base + buffer).max(MIN_ESTIMATE)
}
