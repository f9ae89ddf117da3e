//! Splitting long text into request-sized chunks
//!
//! Speech endpoints cap the length of a single request. Text is cut at
//! punctuation first, then at spaces, and only as a last resort inside a
//! word. Pieces are then packed greedily back together up to the limit.

/// Characters after which a chunk may end
const BOUNDARIES: &[char] = &['.', '!', '?', ';', ':', ',', '…', '。', '！', '？'];

/// Split text into chunks of at most `max_chars` characters.
///
/// Whitespace runs (including newlines) collapse to single spaces.
/// Returns an empty vector for blank text.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if normalized.is_empty() {
        return Vec::new();
    }
    if char_len(&normalized) <= max_chars {
        return vec![normalized];
    }

    let mut units = Vec::new();
    for piece in normalized.split_inclusive(BOUNDARIES) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if char_len(piece) <= max_chars {
            units.push(piece.to_string());
            continue;
        }
        for word in piece.split(' ') {
            if char_len(word) <= max_chars {
                units.push(word.to_string());
            } else {
                units.extend(hard_split(word, max_chars));
            }
        }
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for unit in units {
        if current.is_empty() {
            current = unit;
        } else if char_len(&current) + 1 + char_len(&unit) <= max_chars {
            current.push(' ');
            current.push_str(&unit);
        } else {
            chunks.push(std::mem::replace(&mut current, unit));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn hard_split(word: &str, max_chars: usize) -> Vec<String> {
    word.chars()
        .collect::<Vec<_>>()
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}
