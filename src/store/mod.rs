//! Interface to the host transactional store
//!
//! The index is built *on* a store rather than owning one. The engine needs
//! three things from it:
//!
//! - [`CellStore`]: ordered byte key/value cells (term dictionary, postings)
//! - [`IndexScope`]: the transaction holding the index object, its metadata
//!   attributes, counters and cell stores
//! - [`ChangeView`]: read access to source objects plus the change set of a
//!   transaction about to commit, delivered to a [`PreCommitObserver`]
//!
//! [`memory`] provides an in-memory implementation of all of them; with the
//! `persistent` feature, [`disk`] provides a durable [`IndexScope`] on fjall.

#[cfg(feature = "persistent")]
pub mod disk;
pub mod memory;

pub use memory::{MemoryCells, MemoryDatabase, MemoryTransaction};

use crate::error::Result;
use crate::models::{Atom, ObjectId, TxnId, Value};

/// Identifier of a cell store inside a database
pub type CellStoreId = u32;

/// A key/value pair returned by a scan
pub type Cell = (Vec<u8>, Vec<u8>);

/// Ordered key/value cells living under one cell store id
pub trait CellStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write a cell; an empty value deletes it
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// All cells whose key starts with `prefix`, in ascending key order
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Cell>>;

    fn clear_all(&self) -> Result<()>;

    /// Make pending writes durable
    fn commit(&self) -> Result<()>;
}

/// Transactional scope holding the index object
pub trait IndexScope: Send + Sync {
    type Cells: CellStore;

    fn txn_id(&self) -> TxnId;

    fn is_read_only(&self) -> bool;

    fn get_attr(&self, object: ObjectId, attr: Atom) -> Result<Value>;

    fn set_attr(&self, object: ObjectId, attr: Atom, value: Value) -> Result<()>;

    /// Increment a per-object counter and return the new value (first call yields 1)
    fn inc_counter(&self, object: ObjectId, attr: Atom) -> Result<u32>;

    fn create_cells(&self) -> Result<CellStoreId>;

    fn open_cells(&self, id: CellStoreId) -> Result<Self::Cells>;

    /// Commit the scope's pending object writes
    fn commit(&self) -> Result<()>;
}

/// Read access to objects of a source transaction
pub trait ObjectSource {
    fn object_type(&self, object: ObjectId) -> Option<Atom>;

    /// Attribute value; `previous` selects the last committed value
    fn value(&self, object: ObjectId, attr: Atom, previous: bool) -> Value;
}

/// Pending changes of one object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectChange {
    pub object: ObjectId,
    pub object_type: Option<Atom>,
    pub erased: bool,
    /// Changed attributes in ascending order (empty when erased)
    pub attributes: Vec<Atom>,
}

/// Change set of a transaction that is about to commit
pub trait ChangeView: ObjectSource {
    fn txn_id(&self) -> TxnId;

    /// Pending changes grouped by object, in ascending object order
    fn changes(&self) -> Vec<ObjectChange>;
}

/// Invoked synchronously by a transaction before it commits
pub trait PreCommitObserver: Send + Sync {
    fn pre_commit(&self, changes: &dyn ChangeView) -> Result<()>;
}
