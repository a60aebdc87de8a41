use serde::{Deserialize, Serialize};

use super::object::{DocumentId, ItemId};

/// Hit on a sub-document item, ranked by summed term frequency
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHit {
    pub item: ItemId,
    pub rank: u32,
}

/// Hit on a document, ranked by summed term frequency
///
/// `items` is sorted by item id and holds each id at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocHit {
    pub document: DocumentId,
    pub rank: u32,
    pub items: Vec<ItemHit>,
}

impl ItemHit {
    pub fn new(item: ItemId, rank: u32) -> Self {
        Self { item, rank }
    }
}

impl DocHit {
    pub fn new(document: DocumentId, rank: u32) -> Self {
        Self {
            document,
            rank,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<ItemHit>) -> Self {
        self.items = items;
        self
    }
}

/// Options for multi-term queries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Documents must match every term (AND) instead of any term (OR)
    pub doc_and: bool,
    /// Item lists are intersected instead of united when hits are combined
    pub item_and: bool,
    /// Interpret `*` inside terms as a wildcard
    pub joker: bool,
    /// Terms without an explicit suffix match as prefixes
    pub partial: bool,
}

impl QueryOptions {
    pub fn all() -> Self {
        Self {
            doc_and: true,
            ..Default::default()
        }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_item_and(mut self, item_and: bool) -> Self {
        self.item_and = item_and;
        self
    }

    pub fn with_joker(mut self, joker: bool) -> Self {
        self.joker = joker;
        self
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_hit_builder() {
        let hit = DocHit::new(42, 3).with_items(vec![ItemHit::new(7, 1)]);
        assert_eq!(hit.document, 42);
        assert_eq!(hit.rank, 3);
        assert_eq!(hit.items, vec![ItemHit::new(7, 1)]);
    }

    #[test]
    fn test_query_options() {
        let opts = QueryOptions::all().with_joker(true);
        assert!(opts.doc_and);
        assert!(opts.joker);
        assert!(!opts.item_and);
        assert!(!QueryOptions::any().doc_and);
    }
}
