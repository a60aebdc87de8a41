//! Posting store
//!
//! Frequencies live under [`PostingKey`]s: (term, document) entries and,
//! for items resolved to a different document, (term, document, item)
//! entries. A frequency that would drop to zero deletes the cell.

use super::key::{decode_frequency, encode_frequency, PostingKey};
use super::types::TermId;
use crate::error::Result;
use crate::store::{Cell, CellStore};

/// Outcome of a single frequency adjustment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrequencyUpdate {
    Stored(i32),
    Deleted,
    /// Already at `i32::MAX`; the increment was skipped
    Saturated,
}

/// A decoded posting cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Posting {
    pub key: PostingKey,
    pub frequency: i32,
}

pub struct PostingStore<C: CellStore> {
    cells: C,
}

impl<C: CellStore> PostingStore<C> {
    pub fn new(cells: C) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &C {
        &self.cells
    }

    pub fn frequency(&self, key: &PostingKey) -> Result<i32> {
        let value = self.cells.get(&key.encode())?;
        decode_frequency(value.as_deref())
    }

    /// Increment (or decrement when `remove`) one posting
    pub fn adjust(&self, key: &PostingKey, remove: bool) -> Result<FrequencyUpdate> {
        let encoded = key.encode();
        let current = decode_frequency(self.cells.get(&encoded)?.as_deref())?;

        let frequency = if remove {
            current - 1
        } else if current == i32::MAX {
            return Ok(FrequencyUpdate::Saturated);
        } else {
            current + 1
        };

        if frequency > 0 {
            self.cells.set(&encoded, &encode_frequency(frequency))?;
            Ok(FrequencyUpdate::Stored(frequency))
        } else {
            if current > 0 {
                self.cells.set(&encoded, &[])?;
            }
            Ok(FrequencyUpdate::Deleted)
        }
    }

    /// All postings of `term` in ascending key order
    ///
    /// Cells whose key does not decode are skipped; see [`Self::raw_cells`].
    pub fn scan_term(&self, term: TermId) -> Result<Vec<Posting>> {
        let cells = self.cells.scan_prefix(&PostingKey::term_prefix(term))?;
        let mut postings = Vec::with_capacity(cells.len());
        for (key, value) in cells {
            let Some(key) = PostingKey::decode(&key) else {
                continue;
            };
            postings.push(Posting {
                key,
                frequency: decode_frequency(Some(&value))?,
            });
        }
        Ok(postings)
    }

    /// Every cell of the store, undecoded
    pub fn raw_cells(&self) -> Result<Vec<Cell>> {
        self.cells.scan_prefix(&[])
    }

    pub fn clear(&self) -> Result<()> {
        self.cells.clear_all()
    }

    pub fn commit(&self) -> Result<()> {
        self.cells.commit()
    }
}
