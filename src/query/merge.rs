//! Sorted-merge algebra over hit lists
//!
//! All inputs must be sorted by id with unique ids; outputs keep that shape.
//! Ranks of hits present on both sides are added.

use std::cmp::Ordering;

use crate::models::{DocHit, ItemHit};

fn merge_by<T>(
    lhs: Vec<T>,
    rhs: Vec<T>,
    keep_unmatched: bool,
    key: impl Fn(&T) -> u64,
    mut combine: impl FnMut(T, T) -> T,
) -> Vec<T> {
    let mut out = Vec::with_capacity(if keep_unmatched {
        lhs.len() + rhs.len()
    } else {
        lhs.len().min(rhs.len())
    });
    let mut left = lhs.into_iter().peekable();
    let mut right = rhs.into_iter().peekable();

    loop {
        let step = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => key(l).cmp(&key(r)),
            (Some(_), None) if keep_unmatched => Ordering::Less,
            (None, Some(_)) if keep_unmatched => Ordering::Greater,
            _ => break,
        };
        match step {
            Ordering::Less => {
                if let Some(l) = left.next() {
                    if keep_unmatched {
                        out.push(l);
                    }
                }
            }
            Ordering::Greater => {
                if let Some(r) = right.next() {
                    if keep_unmatched {
                        out.push(r);
                    }
                }
            }
            Ordering::Equal => {
                if let (Some(l), Some(r)) = (left.next(), right.next()) {
                    out.push(combine(l, r));
                }
            }
        }
    }
    out
}

fn combine_items(mut lhs: ItemHit, rhs: ItemHit) -> ItemHit {
    lhs.rank = lhs.rank.saturating_add(rhs.rank);
    lhs
}

fn combine_docs(mut lhs: DocHit, rhs: DocHit, unite_items: bool) -> DocHit {
    lhs.rank = lhs.rank.saturating_add(rhs.rank);
    let items = std::mem::take(&mut lhs.items);
    lhs.items = if unite_items {
        self::unite_items(items, rhs.items)
    } else {
        intersect_items(items, rhs.items)
    };
    lhs
}

/// Documents present on both sides
pub fn intersect(lhs: Vec<DocHit>, rhs: Vec<DocHit>, unite_items: bool) -> Vec<DocHit> {
    merge_by(lhs, rhs, false, |hit| hit.document, |l, r| {
        combine_docs(l, r, unite_items)
    })
}

/// Documents present on either side
pub fn unite(lhs: Vec<DocHit>, rhs: Vec<DocHit>, unite_items: bool) -> Vec<DocHit> {
    merge_by(lhs, rhs, true, |hit| hit.document, |l, r| {
        combine_docs(l, r, unite_items)
    })
}

pub fn intersect_items(lhs: Vec<ItemHit>, rhs: Vec<ItemHit>) -> Vec<ItemHit> {
    merge_by(lhs, rhs, false, |hit| hit.item, combine_items)
}

pub fn unite_items(lhs: Vec<ItemHit>, rhs: Vec<ItemHit>) -> Vec<ItemHit> {
    merge_by(lhs, rhs, true, |hit| hit.item, combine_items)
}
