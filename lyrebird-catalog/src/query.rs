//! Free-text query normalization.
//!
//! Chat input arrives with emoji, punctuation, and decorations that the
//! catalog's search endpoint chokes on. The normalizer strips everything
//! down to the characters the catalog actually indexes.

/// Normalize a free-text search query.
///
/// Deletes every character that is not a Latin letter, Cyrillic letter,
/// ASCII digit, or whitespace, then trims leading/trailing whitespace.
/// Pure and total; empty input yields empty output.
pub fn normalize(text: &str) -> String {
    let kept: String = text.chars().filter(|c| is_searchable(*c)).collect();
    kept.trim().to_owned()
}

fn is_searchable(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_alphanumeric()
        || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}
