// ABOUTME: Text helpers for server-rendered pages: typographic cleanup and page counts
// ABOUTME: Replaces smart punctuation and mojibake with plain ASCII equivalents
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use crate::errors::{AppError, AppResult};

/// UTF-8 right single quote decoded as Windows-1252
const MOJIBAKE_APOSTROPHE: &str = "\u{e2}\u{20ac}\u{2122}";

/// Replace typographic characters with ASCII look-alikes
///
/// Covers the mis-decoded apostrophe `â€™`, em and en dashes, curly double quotes,
/// bullets, non-breaking spaces and ellipses; stars are removed. Other characters
/// pass through unchanged.
#[must_use]
pub fn strip_unicode_characters(input: &str) -> String {
    let input = input.replace(MOJIBAKE_APOSTROPHE, "'");
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\u{2014}' | '\u{2013}' | '\u{2022}' => output.push('-'),
            '\u{201c}' | '\u{201d}' => output.push('"'),
            '\u{00a0}' => output.push(' '),
            '\u{2026}' => output.push_str("..."),
            '\u{2605}' => {}
            _ => output.push(ch),
        }
    }
    output
}

/// Number of pages needed to show `count` items, `limit` per page
///
/// # Errors
///
/// Returns an invalid-input error if `limit` is zero
pub fn page_count(count: u64, limit: u64) -> AppResult<u64> {
    if limit == 0 {
        return Err(AppError::invalid_input("page limit must be positive"));
    }
    Ok(count.div_ceil(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mojibake_apostrophe() {
        assert_eq!(strip_unicode_characters("don\u{e2}\u{20ac}\u{2122}t"), "don't");
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(0, 10).unwrap(), 0);
        assert_eq!(page_count(3, 10).unwrap(), 1);
        assert_eq!(page_count(10, 5).unwrap(), 2);
        assert_eq!(page_count(11, 5).unwrap(), 3);
        assert!(page_count(1, 0).is_err());
    }
}
