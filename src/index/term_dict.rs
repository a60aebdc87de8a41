//! Term dictionary over a cell store
//!
//! Maps collated terms to [`TermId`]s. Keys starting with
//! [`REVERSE_MARKER`] form a second namespace holding the reversed original
//! term of every entry, used for leading-joker lookups.

use std::collections::BTreeSet;

use super::collate::{collate, reverse_key};
use super::key::{decode_term_id, encode_term_id};
use super::types::{TermId, REVERSE_MARKER};
use crate::error::Result;
use crate::store::CellStore;
use crate::tokenizer::Stemmer;

/// Source of fresh term ids
pub trait TermAllocator {
    fn next_term_id(&self) -> Result<TermId>;
}

/// Parameters for creating a missing term
pub struct TermCreation<'a> {
    pub allocator: &'a dyn TermAllocator,
    /// Also write the reversed-term entry
    pub reverse: bool,
}

pub struct TermDictionary<C: CellStore> {
    cells: C,
}

impl<C: CellStore> TermDictionary<C> {
    pub fn new(cells: C) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &C {
        &self.cells
    }

    fn get(&self, key: &[u8]) -> Result<Option<TermId>> {
        match self.cells.get(key)? {
            Some(value) => Ok(Some(decode_term_id(&value)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, key: &[u8], term: TermId) -> Result<()> {
        self.cells.set(key, &encode_term_id(term))
    }

    /// Look up `term`, creating it when missing and `create` is given
    ///
    /// The stemmer, if any, is applied before collation. On every creating
    /// call with `reverse` set, the reversed original term is (re)written so
    /// stemmed variants all point at the same id.
    pub fn resolve(
        &self,
        term: &str,
        stemmer: Option<&dyn Stemmer>,
        create: Option<&TermCreation<'_>>,
    ) -> Result<Option<TermId>> {
        let key = match stemmer {
            Some(stemmer) => collate(&stemmer.stem(term)),
            None => collate(term),
        };
        if key.is_empty() {
            return Ok(None);
        }

        let Some(create) = create else {
            return self.get(&key);
        };

        let id = match self.get(&key)? {
            Some(id) => id,
            None => {
                let id = create.allocator.next_term_id()?;
                self.insert(&key, id)?;
                id
            }
        };
        if create.reverse {
            self.insert(&reverse_key(term), id)?;
        }
        Ok(Some(id))
    }

    /// Ids of all entries whose key starts with `prefix`
    ///
    /// A prefix without the reverse marker only visits the forward namespace.
    pub fn prefix_scan(&self, prefix: &[u8]) -> Result<BTreeSet<TermId>> {
        let mut ids = BTreeSet::new();
        for (key, value) in self.cells.scan_prefix(prefix)? {
            if prefix.first() != Some(&REVERSE_MARKER) && key.first() == Some(&REVERSE_MARKER) {
                continue;
            }
            ids.insert(decode_term_id(&value)?);
        }
        Ok(ids)
    }

    /// Entry counts as (forward, reverse, key bytes, value bytes)
    pub fn entry_counts(&self) -> Result<(usize, usize, usize, usize)> {
        let mut counts = (0, 0, 0, 0);
        for (key, value) in self.cells.scan_prefix(&[])? {
            if key.first() == Some(&REVERSE_MARKER) {
                counts.1 += 1;
            } else {
                counts.0 += 1;
            }
            counts.2 += key.len();
            counts.3 += value.len();
        }
        Ok(counts)
    }

    pub fn clear(&self) -> Result<()> {
        self.cells.clear_all()
    }

    pub fn commit(&self) -> Result<()> {
        self.cells.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IndexScope, MemoryDatabase};
    use crate::tokenizer::SnowballStemmer;
    use crate::config::Language;
    use std::cell::Cell;

    struct Counter(Cell<u32>);

    impl TermAllocator for Counter {
        fn next_term_id(&self) -> Result<TermId> {
            self.0.set(self.0.get() + 1);
            Ok(TermId(self.0.get()))
        }
    }

    fn dictionary() -> TermDictionary<crate::store::MemoryCells> {
        let txn = MemoryDatabase::new().begin();
        let id = txn.create_cells().unwrap();
        TermDictionary::new(txn.open_cells(id).unwrap())
    }

    #[test]
    fn test_resolve_creates_once() {
        let dict = dictionary();
        let counter = Counter(Cell::new(0));
        let create = TermCreation {
            allocator: &counter,
            reverse: false,
        };

        assert_eq!(dict.resolve("cat", None, None).unwrap(), None);
        assert_eq!(dict.resolve("cat", None, Some(&create)).unwrap(), Some(TermId(1)));
        assert_eq!(dict.resolve("Cat", None, Some(&create)).unwrap(), Some(TermId(1)));
        assert_eq!(dict.resolve("dog", None, Some(&create)).unwrap(), Some(TermId(2)));
        assert_eq!(dict.resolve("CAT", None, None).unwrap(), Some(TermId(1)));
        assert_eq!(counter.0.get(), 2);
    }

    #[test]
    fn test_empty_term_never_created() {
        let dict = dictionary();
        let counter = Counter(Cell::new(0));
        let create = TermCreation {
            allocator: &counter,
            reverse: true,
        };
        assert_eq!(dict.resolve("\u{301}", None, Some(&create)).unwrap(), None);
        assert_eq!(counter.0.get(), 0);
    }

    #[test]
    fn test_stemmed_variants_share_id_and_reverse_entries() {
        let dict = dictionary();
        let counter = Counter(Cell::new(0));
        let stemmer = SnowballStemmer::new(Language::English);
        let create = TermCreation {
            allocator: &counter,
            reverse: true,
        };

        let running = dict.resolve("running", Some(&stemmer), Some(&create)).unwrap();
        let runs = dict.resolve("runs", Some(&stemmer), Some(&create)).unwrap();
        assert_eq!(running, runs);

        // Both original spellings are reachable through the reverse namespace
        let ing = dict.prefix_scan(&reverse_key("ing")).unwrap();
        let s = dict.prefix_scan(&reverse_key("uns")).unwrap();
        assert_eq!(ing.into_iter().collect::<Vec<_>>(), vec![running.unwrap()]);
        assert_eq!(s.len(), 1);

        let (forward, reverse, _, _) = dict.entry_counts().unwrap();
        assert_eq!((forward, reverse), (1, 2));
    }

    #[test]
    fn test_prefix_scan_skips_reverse_namespace() {
        let dict = dictionary();
        let counter = Counter(Cell::new(0));
        let create = TermCreation {
            allocator: &counter,
            reverse: true,
        };
        for term in ["car", "cart", "dog"] {
            dict.resolve(term, None, Some(&create)).unwrap();
        }

        let ids: Vec<_> = dict.prefix_scan(b"car").unwrap().into_iter().collect();
        assert_eq!(ids, vec![TermId(1), TermId(2)]);

        let all = dict.prefix_scan(b"").unwrap();
        assert_eq!(all.len(), 3);
    }
}
