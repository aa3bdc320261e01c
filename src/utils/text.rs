//! Text cleanup helpers for scraped values.

use scraper::ElementRef;

/// Keep printable ASCII and the Russian alphabet, drop everything else.
///
/// Removes control characters, NUL bytes, non-breaking spaces and symbols
/// that break the CSV consumers downstream.
pub fn clean_text(text: &str) -> String {
    text.chars().filter(|&c| is_kept(c)).collect()
}

fn is_kept(c: char) -> bool {
    matches!(c, '\x20'..='\x7E' | 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of an element with each text node trimmed and empty nodes dropped.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}
