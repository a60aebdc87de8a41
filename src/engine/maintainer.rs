//! Incremental maintenance from transaction change sets

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::IndexEngine;
use crate::error::Result;
use crate::models::Atom;
use crate::store::{ChangeView, IndexScope, ObjectChange, PreCommitObserver};

/// Object types and attributes the engine reacts to
///
/// No types means every type; no attributes means nothing is indexed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSet {
    types: BTreeSet<Atom>,
    attributes: BTreeSet<Atom>,
}

impl WatchSet {
    pub fn add_type(&mut self, object_type: Atom) {
        self.types.insert(object_type);
    }

    pub fn add_attribute(&mut self, attr: Atom) {
        self.attributes.insert(attr);
    }

    pub fn watches_type(&self, object_type: Option<Atom>) -> bool {
        self.types.is_empty() || object_type.is_some_and(|t| self.types.contains(&t))
    }

    pub fn watches_attribute(&self, attr: Atom) -> bool {
        self.attributes.contains(&attr)
    }

    pub fn attributes(&self) -> impl Iterator<Item = Atom> + '_ {
        self.attributes.iter().copied()
    }
}

impl<S: IndexScope> IndexEngine<S> {
    fn is_watched(&self, change: &ObjectChange) -> bool {
        change.object != self.index && self.watch.watches_type(change.object_type)
    }

    /// Apply one object's changes; returns the number of attributes touched
    fn apply_change(&self, changes: &dyn ChangeView, change: &ObjectChange) -> Result<usize> {
        let object = change.object;
        let mut applied = 0;

        if change.erased {
            for attr in self.watch.attributes() {
                let old = changes.value(object, attr, true);
                if !old.is_null() {
                    self.tokenize_and_apply(&old, object, true)?;
                    applied += 1;
                }
            }
            return Ok(applied);
        }

        for &attr in &change.attributes {
            if !self.watch.watches_attribute(attr) {
                continue;
            }
            let old = changes.value(object, attr, true);
            if !old.is_null() {
                self.tokenize_and_apply(&old, object, true)?;
            }
            let current = changes.value(object, attr, false);
            if !current.is_null() {
                self.tokenize_and_apply(&current, object, false)?;
            }
            applied += 1;
        }
        Ok(applied)
    }
}

impl<S: IndexScope> PreCommitObserver for IndexEngine<S> {
    fn pre_commit(&self, changes: &dyn ChangeView) -> Result<()> {
        if self.stores.is_none() {
            return Ok(());
        }
        if self.check_empty() && self.is_empty()? {
            debug!(index = self.index, txn = %changes.txn_id(), "index empty, skipping changes");
            return Ok(());
        }

        let mut applied = 0;
        for change in changes.changes() {
            if self.is_watched(&change) {
                applied += self.apply_change(changes, &change)?;
            }
        }

        if applied > 0 {
            self.commit(false)?;
        }
        debug!(index = self.index, txn = %changes.txn_id(), applied, "changes indexed");
        Ok(())
    }
}
