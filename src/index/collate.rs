//! Term collation
//!
//! Dictionary keys are built by lower-casing, NFKD-decomposing and dropping
//! combining marks and control characters, so "Café", "CAFE" and "café" share
//! one key. The result is plain UTF-8 and never starts with
//! [`REVERSE_MARKER`](super::types::REVERSE_MARKER).

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::types::REVERSE_MARKER;

/// Canonical dictionary key of `term`
pub fn collate(term: &str) -> Vec<u8> {
    term.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c) && !c.is_control())
        .collect::<String>()
        .into_bytes()
}

/// Dictionary key of the reversed form of `term`, in the reverse namespace
pub fn reverse_key(term: &str) -> Vec<u8> {
    let reversed: String = term.chars().rev().collect();
    let mut key = Vec::with_capacity(reversed.len() + 1);
    key.push(REVERSE_MARKER);
    key.extend(collate(&reversed));
    key
}
