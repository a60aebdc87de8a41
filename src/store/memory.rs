//! In-memory transactional object and cell store
//!
//! Writes made through a [`MemoryTransaction`] are staged and only become
//! visible to other transactions on commit. Cell stores commit on their own,
//! independently of the object writes of the transaction that opened them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::{
    Cell, CellStore, CellStoreId, ChangeView, IndexScope, ObjectChange, ObjectSource,
    PreCommitObserver,
};
use crate::error::{QuarryError, Result};
use crate::models::{Atom, ObjectId, TxnId, Value};

#[derive(Debug, Default)]
struct StoredObject {
    object_type: Atom,
    attrs: BTreeMap<Atom, Value>,
}

#[derive(Debug, Default)]
struct DbState {
    objects: BTreeMap<ObjectId, StoredObject>,
    cells: HashMap<CellStoreId, BTreeMap<Vec<u8>, Vec<u8>>>,
    last_object: ObjectId,
    last_cells: CellStoreId,
}

/// Shared in-memory database
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    state: Arc<RwLock<DbState>>,
    last_txn: Arc<AtomicU64>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a read-write transaction
    pub fn begin(&self) -> MemoryTransaction {
        self.start(false)
    }

    /// Start a transaction that rejects every write
    pub fn begin_read_only(&self) -> MemoryTransaction {
        self.start(true)
    }

    /// Number of committed objects
    pub fn object_count(&self) -> usize {
        self.state.read().objects.len()
    }

    fn start(&self, read_only: bool) -> MemoryTransaction {
        let id = TxnId(self.last_txn.fetch_add(1, Ordering::SeqCst) + 1);
        MemoryTransaction {
            inner: Arc::new(TxnInner {
                id,
                read_only,
                db: self.state.clone(),
                pending: Mutex::new(Pending::default()),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct CellOverlay {
    cleared: bool,
    /// `None` marks a deleted cell
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

#[derive(Debug, Default)]
struct Pending {
    created: BTreeMap<ObjectId, Atom>,
    erased: BTreeSet<ObjectId>,
    attrs: BTreeMap<(ObjectId, Atom), Value>,
    cells: HashMap<CellStoreId, CellOverlay>,
    committing: bool,
}

struct TxnInner {
    id: TxnId,
    read_only: bool,
    db: Arc<RwLock<DbState>>,
    pending: Mutex<Pending>,
    observers: Mutex<Vec<Weak<dyn PreCommitObserver>>>,
}

/// Handle to a transaction on a [`MemoryDatabase`]; clones share the transaction
#[derive(Clone)]
pub struct MemoryTransaction {
    inner: Arc<TxnInner>,
}

impl MemoryTransaction {
    pub fn id(&self) -> TxnId {
        self.inner.id
    }

    pub fn is_read_only(&self) -> bool {
        self.inner.read_only
    }

    fn check_writable(&self) -> Result<()> {
        if self.inner.read_only {
            Err(QuarryError::ReadOnly(self.inner.id))
        } else {
            Ok(())
        }
    }

    /// Create a new object of `object_type`
    pub fn create_object(&self, object_type: Atom) -> Result<ObjectId> {
        self.check_writable()?;
        let mut pending = self.inner.pending.lock();
        let object = {
            let mut db = self.inner.db.write();
            db.last_object += 1;
            db.last_object
        };
        pending.created.insert(object, object_type);
        Ok(object)
    }

    pub fn set_value(&self, object: ObjectId, attr: Atom, value: impl Into<Value>) -> Result<()> {
        self.check_writable()?;
        let mut pending = self.inner.pending.lock();
        if !self.exists(&pending, object) {
            return Err(QuarryError::UnknownObject(object));
        }
        pending.attrs.insert((object, attr), value.into());
        Ok(())
    }

    pub fn erase_object(&self, object: ObjectId) -> Result<()> {
        self.check_writable()?;
        let mut pending = self.inner.pending.lock();
        if !self.exists(&pending, object) {
            return Err(QuarryError::UnknownObject(object));
        }
        pending.erased.insert(object);
        Ok(())
    }

    fn exists(&self, pending: &Pending, object: ObjectId) -> bool {
        if pending.erased.contains(&object) {
            return false;
        }
        pending.created.contains_key(&object) || self.inner.db.read().objects.contains_key(&object)
    }

    /// Register an observer notified before every commit of this transaction
    ///
    /// Only a weak reference is kept; dropped observers are skipped.
    pub fn add_observer(&self, observer: Arc<dyn PreCommitObserver>) {
        self.inner.observers.lock().push(Arc::downgrade(&observer));
    }

    /// Notify observers, then publish all staged writes
    ///
    /// A commit requested while this transaction is already committing (for
    /// example by an observer) is folded into the running commit.
    pub fn commit(&self) -> Result<()> {
        self.check_writable()?;
        {
            let mut pending = self.inner.pending.lock();
            if pending.committing {
                return Ok(());
            }
            pending.committing = true;
        }

        let view = PendingChanges {
            txn: self,
            changes: self.pending_changes(),
        };
        let observers: Vec<Arc<dyn PreCommitObserver>> = {
            let mut observers = self.inner.observers.lock();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };

        if let Err(e) = observers.iter().try_for_each(|o| o.pre_commit(&view)) {
            self.inner.pending.lock().committing = false;
            return Err(e);
        }

        self.apply();
        Ok(())
    }

    /// Drop all staged writes
    pub fn rollback(&self) {
        *self.inner.pending.lock() = Pending::default();
    }

    fn pending_changes(&self) -> Vec<ObjectChange> {
        let pending = self.inner.pending.lock();
        let db = self.inner.db.read();

        let mut objects: BTreeSet<ObjectId> = pending.created.keys().copied().collect();
        objects.extend(pending.erased.iter().copied());
        objects.extend(pending.attrs.keys().map(|(object, _)| *object));

        objects
            .into_iter()
            .map(|object| {
                let erased = pending.erased.contains(&object);
                let object_type = pending
                    .created
                    .get(&object)
                    .copied()
                    .or_else(|| db.objects.get(&object).map(|o| o.object_type));
                let attributes = if erased {
                    Vec::new()
                } else {
                    pending
                        .attrs
                        .range((object, Atom::MIN)..=(object, Atom::MAX))
                        .map(|((_, attr), _)| *attr)
                        .collect()
                };
                ObjectChange {
                    object,
                    object_type,
                    erased,
                    attributes,
                }
            })
            .collect()
    }

    fn apply(&self) {
        let mut pending = self.inner.pending.lock();
        let mut db = self.inner.db.write();
        let staged = std::mem::take(&mut *pending);

        for (object, object_type) in staged.created {
            db.objects.insert(
                object,
                StoredObject {
                    object_type,
                    attrs: BTreeMap::new(),
                },
            );
        }
        for ((object, attr), value) in staged.attrs {
            if let Some(stored) = db.objects.get_mut(&object) {
                if value.is_null() {
                    stored.attrs.remove(&attr);
                } else {
                    stored.attrs.insert(attr, value);
                }
            }
        }
        for object in &staged.erased {
            db.objects.remove(object);
        }
        for (id, overlay) in staged.cells {
            apply_overlay(&mut db, id, overlay);
        }
        debug!(txn = %self.inner.id, erased = staged.erased.len(), "transaction committed");
    }

    fn committed_value(&self, object: ObjectId, attr: Atom) -> Value {
        self.inner
            .db
            .read()
            .objects
            .get(&object)
            .and_then(|o| o.attrs.get(&attr).cloned())
            .unwrap_or_default()
    }
}

fn apply_overlay(db: &mut DbState, id: CellStoreId, overlay: CellOverlay) {
    let cells = db.cells.entry(id).or_default();
    if overlay.cleared {
        cells.clear();
    }
    for (key, value) in overlay.writes {
        match value {
            Some(value) => cells.insert(key, value),
            None => cells.remove(&key),
        };
    }
}

impl ObjectSource for MemoryTransaction {
    fn object_type(&self, object: ObjectId) -> Option<Atom> {
        if let Some(object_type) = self.inner.pending.lock().created.get(&object) {
            return Some(*object_type);
        }
        self.inner.db.read().objects.get(&object).map(|o| o.object_type)
    }

    fn value(&self, object: ObjectId, attr: Atom, previous: bool) -> Value {
        if previous {
            return self.committed_value(object, attr);
        }
        {
            let pending = self.inner.pending.lock();
            if pending.erased.contains(&object) {
                return Value::Null;
            }
            if let Some(value) = pending.attrs.get(&(object, attr)) {
                return value.clone();
            }
            if pending.created.contains_key(&object) {
                return Value::Null;
            }
        }
        self.committed_value(object, attr)
    }
}

impl IndexScope for MemoryTransaction {
    type Cells = MemoryCells;

    fn txn_id(&self) -> TxnId {
        self.inner.id
    }

    fn is_read_only(&self) -> bool {
        self.inner.read_only
    }

    fn get_attr(&self, object: ObjectId, attr: Atom) -> Result<Value> {
        Ok(self.value(object, attr, false))
    }

    fn set_attr(&self, object: ObjectId, attr: Atom, value: Value) -> Result<()> {
        self.set_value(object, attr, value)
    }

    fn inc_counter(&self, object: ObjectId, attr: Atom) -> Result<u32> {
        let next = self
            .value(object, attr, false)
            .as_u32()
            .checked_add(1)
            .ok_or_else(|| QuarryError::Internal(format!("counter {attr} of object {object} exhausted")))?;
        self.set_value(object, attr, Value::from(next))?;
        Ok(next)
    }

    fn create_cells(&self) -> Result<CellStoreId> {
        self.check_writable()?;
        let mut db = self.inner.db.write();
        db.last_cells += 1;
        let id = db.last_cells;
        db.cells.insert(id, BTreeMap::new());
        debug!(txn = %self.inner.id, cells = id, "cell store created");
        Ok(id)
    }

    fn open_cells(&self, id: CellStoreId) -> Result<MemoryCells> {
        if !self.inner.db.read().cells.contains_key(&id) {
            return Err(QuarryError::UnknownCellStore(id));
        }
        Ok(MemoryCells {
            txn: self.clone(),
            id,
        })
    }

    fn commit(&self) -> Result<()> {
        MemoryTransaction::commit(self)
    }
}

/// View handed to observers during a commit
struct PendingChanges<'a> {
    txn: &'a MemoryTransaction,
    changes: Vec<ObjectChange>,
}

impl ObjectSource for PendingChanges<'_> {
    fn object_type(&self, object: ObjectId) -> Option<Atom> {
        self.txn.object_type(object)
    }

    fn value(&self, object: ObjectId, attr: Atom, previous: bool) -> Value {
        self.txn.value(object, attr, previous)
    }
}

impl ChangeView for PendingChanges<'_> {
    fn txn_id(&self) -> TxnId {
        self.txn.id()
    }

    fn changes(&self) -> Vec<ObjectChange> {
        self.changes.clone()
    }
}

/// Cell store seen through a transaction
#[derive(Clone)]
pub struct MemoryCells {
    txn: MemoryTransaction,
    id: CellStoreId,
}

impl MemoryCells {
    pub fn id(&self) -> CellStoreId {
        self.id
    }
}

impl CellStore for MemoryCells {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let pending = self.txn.inner.pending.lock();
        if let Some(overlay) = pending.cells.get(&self.id) {
            if let Some(value) = overlay.writes.get(key) {
                return Ok(value.clone());
            }
            if overlay.cleared {
                return Ok(None);
            }
        }
        let db = self.txn.inner.db.read();
        let cells = db
            .cells
            .get(&self.id)
            .ok_or(QuarryError::UnknownCellStore(self.id))?;
        Ok(cells.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.txn.check_writable()?;
        let mut pending = self.txn.inner.pending.lock();
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_vec())
        };
        pending
            .cells
            .entry(self.id)
            .or_default()
            .writes
            .insert(key.to_vec(), value);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Cell>> {
        let pending = self.txn.inner.pending.lock();
        let overlay = pending.cells.get(&self.id);
        let range = (Bound::Included(prefix), Bound::Unbounded);

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        if !overlay.is_some_and(|o| o.cleared) {
            let db = self.txn.inner.db.read();
            let cells = db
                .cells
                .get(&self.id)
                .ok_or(QuarryError::UnknownCellStore(self.id))?;
            merged.extend(
                cells
                    .range::<[u8], _>(range)
                    .take_while(|(key, _)| key.starts_with(prefix))
                    .map(|(key, value)| (key.clone(), value.clone())),
            );
        }
        if let Some(overlay) = overlay {
            for (key, value) in overlay
                .writes
                .range::<[u8], _>(range)
                .take_while(|(key, _)| key.starts_with(prefix))
            {
                match value {
                    Some(value) => merged.insert(key.clone(), value.clone()),
                    None => merged.remove(key),
                };
            }
        }
        Ok(merged.into_iter().collect())
    }

    fn clear_all(&self) -> Result<()> {
        self.txn.check_writable()?;
        let mut pending = self.txn.inner.pending.lock();
        let overlay = pending.cells.entry(self.id).or_default();
        overlay.cleared = true;
        overlay.writes.clear();
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut pending = self.txn.inner.pending.lock();
        if let Some(overlay) = pending.cells.remove(&self.id) {
            let mut db = self.txn.inner.db.write();
            apply_overlay(&mut db, self.id, overlay);
        }
        Ok(())
    }
}
