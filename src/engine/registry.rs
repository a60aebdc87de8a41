use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use super::IndexEngine;
use crate::models::TxnId;
use crate::store::IndexScope;

/// Finds the engine responsible for a transaction
///
/// Engines are registered under their source and index transaction ids.
/// Entries hold weak references, so a dropped engine disappears from
/// lookups. Registering another engine for the same transaction replaces
/// the previous entry.
pub struct EngineRegistry<S: IndexScope> {
    engines: RwLock<HashMap<TxnId, Weak<IndexEngine<S>>>>,
}

impl<S: IndexScope> Default for EngineRegistry<S> {
    fn default() -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
        }
    }
}

impl<S: IndexScope> EngineRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a configured engine and register it
    ///
    /// The returned handle is the only strong reference; keep it alive (and
    /// subscribe it as the source transaction's observer) for as long as
    /// lookups should find it.
    pub fn share(&self, engine: IndexEngine<S>) -> Arc<IndexEngine<S>> {
        let engine = Arc::new(engine);
        self.register(&engine);
        engine
    }

    /// Make `engine` findable under its source and index transactions
    ///
    /// Opening an engine does not register it; the host calls this (or
    /// [`share`](Self::share)) once configuration is done.
    pub fn register(&self, engine: &Arc<IndexEngine<S>>) {
        let weak = Arc::downgrade(engine);
        let mut engines = self.engines.write();
        engines.insert(engine.source_txn(), weak.clone());
        engines.insert(engine.index_txn(), weak);
        debug!(
            source = %engine.source_txn(),
            index = %engine.index_txn(),
            "engine registered"
        );
    }

    pub fn lookup(&self, txn: TxnId) -> Option<Arc<IndexEngine<S>>> {
        self.engines.read().get(&txn).and_then(Weak::upgrade)
    }

    /// Remove the entries that still point at `engine`
    pub fn unregister(&self, engine: &IndexEngine<S>) {
        let mut engines = self.engines.write();
        for txn in [engine.source_txn(), engine.index_txn()] {
            if engines
                .get(&txn)
                .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), engine))
            {
                engines.remove(&txn);
            }
        }
    }

    /// Drop entries of engines that no longer exist; returns how many
    pub fn prune(&self) -> usize {
        let mut engines = self.engines.write();
        let before = engines.len();
        engines.retain(|_, weak| weak.strong_count() > 0);
        before - engines.len()
    }

    pub fn len(&self) -> usize {
        self.engines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.read().is_empty()
    }
}
