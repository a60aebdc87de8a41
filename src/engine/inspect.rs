use std::fmt;

use super::IndexEngine;
use crate::error::Result;
use crate::index::{decode_frequency, IndexStats, PostingKey};
use crate::store::IndexScope;

/// Inconsistency found by [`IndexEngine::verify`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    UndecodableKey(Vec<u8>),
    BadFrequency { key: PostingKey },
    /// Item entry with no entry for its document
    OrphanedItem { key: PostingKey },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UndecodableKey(key) => write!(f, "undecodable posting key {:?}", key),
            Violation::BadFrequency { key } => write!(f, "bad frequency at {:?}", key),
            Violation::OrphanedItem { key } => write!(f, "item posting without document: {:?}", key),
        }
    }
}

impl<S: IndexScope> IndexEngine<S> {
    /// Entry and byte counts of the dictionary and posting stores
    pub fn stats(&self) -> Result<IndexStats> {
        let Some(stores) = &self.stores else {
            return Ok(IndexStats::default());
        };

        let (terms, reverse_terms, mut key_bytes, mut value_bytes) = stores.dict.entry_counts()?;
        let mut stats = IndexStats {
            terms,
            reverse_terms,
            ..Default::default()
        };
        for (key, value) in stores.postings.raw_cells()? {
            key_bytes += key.len();
            value_bytes += value.len();
            match PostingKey::decode(&key).map(|k| k.components()) {
                Some(3) => stats.item_postings += 1,
                _ => stats.document_postings += 1,
            }
        }
        stats.key_bytes = key_bytes;
        stats.value_bytes = value_bytes;
        Ok(stats)
    }

    /// Check every posting for a decodable key, a positive frequency and,
    /// for item entries, a matching document entry
    pub fn verify(&self) -> Result<Vec<Violation>> {
        let Some(stores) = &self.stores else {
            return Ok(Vec::new());
        };

        let mut violations = Vec::new();
        let mut open_document = None;
        for (raw, value) in stores.postings.raw_cells()? {
            let Some(key) = PostingKey::decode(&raw) else {
                violations.push(Violation::UndecodableKey(raw));
                continue;
            };
            if !matches!(decode_frequency(Some(&value)), Ok(f) if f > 0) {
                violations.push(Violation::BadFrequency { key });
            }
            match key.item {
                None => open_document = Some((key.term, key.document)),
                Some(_) if open_document == Some((key.term, key.document)) => {}
                Some(_) => violations.push(Violation::OrphanedItem { key }),
            }
        }
        Ok(violations)
    }
}
