//! The index engine
//!
//! An [`IndexEngine`] owns the term dictionary and posting store of one index
//! object. The stores and the term counter live in the index's transactional
//! scope, which may be the transaction holding the indexed objects or a
//! separate one. Indexing happens through direct calls (`indexing`) or
//! through the pre-commit notification of the source transaction
//! (`maintainer`); queries are in `search`.

mod diagnostics;
mod indexing;
mod inspect;
mod maintainer;
mod registry;
mod search;

pub use diagnostics::Diagnostic;
pub use inspect::Violation;
pub use maintainer::WatchSet;
pub use registry::EngineRegistry;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::{EngineSettings, TokenizerConfig};
use crate::error::{QuarryError, Result};
use crate::index::{
    PostingStore, TermAllocator, TermDictionary, TermId, ATTR_DICT, ATTR_MAX_TERM, ATTR_POSTS,
};
use crate::models::{Atom, ObjectId, TxnId, Value};
use crate::store::{CellStoreId, IndexScope};
use crate::tokenizer::{Analysis, DocumentResolver, Stemmer, Stopper, Tokenizer};

/// Engine shared between the host application and its transactions
pub type SharedEngine<S> = Arc<IndexEngine<S>>;

struct IndexStores<C: crate::store::CellStore> {
    dict: TermDictionary<C>,
    postings: PostingStore<C>,
}

pub struct IndexEngine<S: IndexScope> {
    index: ObjectId,
    scope: S,
    source: TxnId,
    /// `None` while uninitialized (stores missing on a read-only scope)
    stores: Option<IndexStores<S::Cells>>,
    settings: EngineSettings,
    watch: WatchSet,
    tokenizer: Option<Box<dyn Tokenizer>>,
    stemmer: Option<Box<dyn Stemmer>>,
    stopper: Option<Box<dyn Stopper>>,
    resolver: Option<Box<dyn DocumentResolver>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl<S: IndexScope> IndexEngine<S> {
    /// Open the index held by object `index` in `scope`
    ///
    /// Missing stores are created on a writable scope. On a read-only scope
    /// the engine stays uninitialized: queries return nothing and indexing
    /// does nothing. `source` is the transaction whose objects are indexed;
    /// `None` means the index scope itself.
    pub fn open(index: ObjectId, scope: S, source: Option<TxnId>) -> Result<Self> {
        if index == 0 {
            return Err(QuarryError::NullIndexObject);
        }

        let dict_id = scope.get_attr(index, ATTR_DICT)?.as_u32();
        let posts_id = scope.get_attr(index, ATTR_POSTS)?.as_u32();

        let stores = if dict_id != 0 && posts_id != 0 {
            Some(IndexStores {
                dict: TermDictionary::new(scope.open_cells(dict_id)?),
                postings: PostingStore::new(scope.open_cells(posts_id)?),
            })
        } else if scope.is_read_only() {
            debug!(index, txn = %scope.txn_id(), "index stores missing on read-only scope");
            None
        } else {
            let dict_id = Self::ensure_cells(&scope, index, ATTR_DICT, dict_id)?;
            let posts_id = Self::ensure_cells(&scope, index, ATTR_POSTS, posts_id)?;
            Some(IndexStores {
                dict: TermDictionary::new(scope.open_cells(dict_id)?),
                postings: PostingStore::new(scope.open_cells(posts_id)?),
            })
        };

        let source = source.unwrap_or_else(|| scope.txn_id());
        Ok(Self {
            index,
            scope,
            source,
            stores,
            settings: EngineSettings::default(),
            watch: WatchSet::default(),
            tokenizer: None,
            stemmer: None,
            stopper: None,
            resolver: None,
            diagnostics: Mutex::new(Vec::new()),
        })
    }

    fn ensure_cells(scope: &S, index: ObjectId, attr: Atom, id: CellStoreId) -> Result<CellStoreId> {
        if id != 0 {
            return Ok(id);
        }
        let id = scope.create_cells()?;
        scope.set_attr(index, attr, Value::from(id))?;
        debug!(index, attr, cells = id, "index store created");
        Ok(id)
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EngineSettings {
        &mut self.settings
    }

    /// Restrict maintenance to objects of `object_type` (no types = all)
    pub fn watch_type(&mut self, object_type: Atom) {
        self.watch.add_type(object_type);
    }

    /// Index attribute `attr` of watched objects
    pub fn watch_attribute(&mut self, attr: Atom) {
        self.watch.add_attribute(attr);
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    pub fn set_tokenizer(&mut self, tokenizer: impl Tokenizer + 'static) {
        self.tokenizer = Some(Box::new(tokenizer));
    }

    pub fn set_stemmer(&mut self, stemmer: impl Stemmer + 'static) {
        self.stemmer = Some(Box::new(stemmer));
    }

    pub fn set_stopper(&mut self, stopper: impl Stopper + 'static) {
        self.stopper = Some(Box::new(stopper));
    }

    pub fn set_document_resolver(&mut self, resolver: impl DocumentResolver + 'static) {
        self.resolver = Some(Box::new(resolver));
    }

    /// Replace tokenizer, stemmer and stopper with the ones described by `config`
    pub fn configure_analysis(&mut self, config: &TokenizerConfig) {
        let analysis = Analysis::from_config(config);
        self.tokenizer = Some(analysis.tokenizer);
        self.stemmer = analysis.stemmer;
        self.stopper = analysis.stopper;
    }

    pub fn index_object_id(&self) -> ObjectId {
        self.index
    }

    pub fn index_txn(&self) -> TxnId {
        self.scope.txn_id()
    }

    pub fn source_txn(&self) -> TxnId {
        self.source
    }

    pub fn scope(&self) -> &S {
        &self.scope
    }

    /// Whether the dictionary and posting stores are available
    pub fn is_initialized(&self) -> bool {
        self.stores.is_some()
    }

    fn separate_scope(&self) -> bool {
        self.source != self.scope.txn_id()
    }

    /// Effective empty-skip setting
    pub fn check_empty(&self) -> bool {
        self.settings
            .check_empty
            .unwrap_or_else(|| self.separate_scope())
    }

    /// True when no term was ever assigned (or the index was cleared)
    pub fn is_empty(&self) -> Result<bool> {
        if self.stores.is_none() {
            return Ok(true);
        }
        Ok(self.scope.get_attr(self.index, ATTR_MAX_TERM)?.as_u32() == 0)
    }

    /// Persist dictionary and postings
    ///
    /// The index scope itself is committed as well when `force` is set or
    /// when it is separate from the source transaction.
    pub fn commit(&self, force: bool) -> Result<()> {
        let Some(stores) = &self.stores else {
            return Ok(());
        };
        stores.dict.commit()?;
        stores.postings.commit()?;
        if force || self.separate_scope() {
            self.scope.commit()?;
        }
        debug!(index = self.index, force, "index committed");
        Ok(())
    }

    /// Drop every term and posting and reset the term counter
    ///
    /// The index scope is always committed, so other readers see the
    /// cleared index even when it shares its transaction with the source.
    pub fn clear_index(&self) -> Result<()> {
        let Some(stores) = &self.stores else {
            return Ok(());
        };
        stores.dict.clear()?;
        stores.postings.clear()?;
        self.scope
            .set_attr(self.index, ATTR_MAX_TERM, Value::from(0u32))?;
        self.commit(true)
    }

    /// Drain diagnostics raised since the last call
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    fn report(&self, diagnostic: Diagnostic) {
        warn!(index = self.index, "{}", diagnostic);
        self.diagnostics.lock().push(diagnostic);
    }
}

impl<S: IndexScope> TermAllocator for IndexEngine<S> {
    fn next_term_id(&self) -> Result<TermId> {
        let raw = self.scope.inc_counter(self.index, ATTR_MAX_TERM)?;
        TermId::new(raw).ok_or_else(|| QuarryError::Internal("term counter returned 0".into()))
    }
}
