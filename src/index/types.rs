//! Core types for the term/posting index

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Atom;

/// Dense term identifier, assigned from 1 upwards and never reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(pub u32);

impl TermId {
    /// Wrap a raw id; 0 is the "unassigned" value and yields `None`
    pub fn new(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "term_{}", self.0)
    }
}

/// Index object attribute holding the last assigned term id
pub const ATTR_MAX_TERM: Atom = 20;
/// Index object attribute holding the term dictionary cell store id
pub const ATTR_DICT: Atom = 21;
/// Index object attribute holding the posting cell store id
pub const ATTR_POSTS: Atom = 22;

/// Leading byte of reversed-term dictionary keys (never produced by collation)
pub const REVERSE_MARKER: u8 = 0x07;

/// Size report over the dictionary and posting stores
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Forward dictionary entries (one per distinct term)
    pub terms: usize,
    /// Reversed-term dictionary entries
    pub reverse_terms: usize,
    /// (term, document) postings
    pub document_postings: usize,
    /// (term, document, item) postings
    pub item_postings: usize,
    pub key_bytes: usize,
    pub value_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_id_zero_is_unassigned() {
        assert_eq!(TermId::new(0), None);
        assert_eq!(TermId::new(5), Some(TermId(5)));
        assert_eq!(TermId(5).to_string(), "term_5");
    }
}
