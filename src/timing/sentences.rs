const TERMINATORS: &[char] = &['。', '！', '？', '!', '?', '；', ';'];

/// Split a script into voice sentences
///
/// Breaks after CJK and ASCII terminal punctuation, and after a `.` that ends the
/// text or is followed by whitespace, so "3.5" and "e.g.x" stay intact.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        let boundary = if TERMINATORS.contains(&c) {
            // Keep runs like "?!" or closing quotes with the sentence
            while let Some(&next) = chars.peek() {
                if TERMINATORS.contains(&next) || matches!(next, '”' | '"' | '」' | '』' | ')' | '）') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            true
        } else if c == '.' {
            chars.peek().map_or(true, |next| next.is_whitespace())
        } else {
            false
        };

        if boundary {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }

    push_trimmed(&mut sentences, &current);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
