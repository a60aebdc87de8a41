use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::merge::unite_items;
use crate::index::Posting;
use crate::models::{DocHit, DocumentId, ItemHit};

/// Folds per-term posting scans into document hits
///
/// A scan yields each document entry followed by that document's item
/// entries. Hits of several terms on one document are summed and their
/// item lists united.
#[derive(Debug, Default)]
pub struct HitAccumulator {
    hits: BTreeMap<DocumentId, DocHit>,
}

impl HitAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the postings of one term, in ascending key order
    pub fn add_term(&mut self, postings: &[Posting]) {
        let mut open: Option<DocHit> = None;
        for posting in postings {
            let rank = posting.frequency.max(0) as u32;
            match posting.key.item {
                None => {
                    if let Some(hit) = open.take() {
                        self.merge(hit);
                    }
                    open = Some(DocHit::new(posting.key.document, rank));
                }
                Some(item) => match open.as_mut() {
                    Some(hit) if hit.document == posting.key.document => {
                        hit.items.push(ItemHit::new(item, rank));
                    }
                    // orphaned item entry
                    _ => {}
                },
            }
        }
        if let Some(hit) = open {
            self.merge(hit);
        }
    }

    fn merge(&mut self, hit: DocHit) {
        match self.hits.entry(hit.document) {
            Entry::Vacant(entry) => {
                entry.insert(hit);
            }
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.rank = existing.rank.saturating_add(hit.rank);
                let items = std::mem::take(&mut existing.items);
                existing.items = unite_items(items, hit.items);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits sorted by document id
    pub fn finish(self) -> Vec<DocHit> {
        self.hits.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{PostingKey, TermId};

    fn posting(key: PostingKey, frequency: i32) -> Posting {
        Posting { key, frequency }
    }

    #[test]
    fn test_items_attach_to_open_document() {
        let t = TermId(1);
        let mut acc = HitAccumulator::new();
        acc.add_term(&[
            posting(PostingKey::document(t, 5), 3),
            posting(PostingKey::item(t, 5, 50), 2),
            posting(PostingKey::item(t, 5, 51), 1),
            posting(PostingKey::document(t, 7), 1),
        ]);

        let hits = acc.finish();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].rank, 3);
        assert_eq!(hits[0].items, vec![ItemHit::new(50, 2), ItemHit::new(51, 1)]);
        assert!(hits[1].items.is_empty());
    }

    #[test]
    fn test_terms_accumulate_per_document() {
        let mut acc = HitAccumulator::new();
        acc.add_term(&[
            posting(PostingKey::document(TermId(1), 5), 1),
            posting(PostingKey::item(TermId(1), 5, 50), 1),
        ]);
        acc.add_term(&[
            posting(PostingKey::document(TermId(2), 3), 4),
            posting(PostingKey::document(TermId(2), 5), 2),
            posting(PostingKey::item(TermId(2), 5, 49), 2),
            posting(PostingKey::item(TermId(2), 5, 50), 1),
        ]);

        let hits = acc.finish();
        assert_eq!(hits.iter().map(|h| h.document).collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(hits[1].rank, 3);
        assert_eq!(hits[1].items, vec![ItemHit::new(49, 2), ItemHit::new(50, 2)]);
    }

    #[test]
    fn test_orphaned_item_ignored() {
        let mut acc = HitAccumulator::new();
        acc.add_term(&[posting(PostingKey::item(TermId(1), 5, 50), 1)]);
        assert!(acc.is_empty());
    }
}
