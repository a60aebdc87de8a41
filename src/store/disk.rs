//! Durable index scope on top of fjall
//!
//! Index metadata attributes and counters live in one keyspace; every cell
//! store gets its own keyspace named `cells_<id>`.
//!
//! Attribute and cell writes are staged in memory and reach fjall only on
//! commit, as one write batch covering the whole scope. Dropping a scope
//! without committing discards them. Object and cell store ids are
//! allocated durably so they are never handed out twice.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fjall::{Database, Keyspace, KeyspaceCreateOptions, PersistMode};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{Cell, CellStore, CellStoreId, IndexScope};
use crate::error::{QuarryError, Result};
use crate::models::{Atom, ObjectId, TxnId, Value};

const META_KEYSPACE: &str = "index_meta";
const LAST_OBJECT_KEY: &[u8] = b"last_object";
const LAST_CELLS_KEY: &[u8] = b"last_cells";

static LAST_SCOPE: AtomicU64 = AtomicU64::new(0);

fn storage_err(e: impl std::fmt::Display) -> QuarryError {
    QuarryError::Storage(e.to_string())
}

fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let buf: [u8; 8] = bytes
        .try_into()
        .map_err(|_| QuarryError::CorruptValue(format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(buf))
}

fn attr_key(object: ObjectId, attr: Atom) -> Vec<u8> {
    let mut key = Vec::with_capacity(13);
    key.push(b'a');
    key.extend_from_slice(&object.to_be_bytes());
    key.extend_from_slice(&attr.to_be_bytes());
    key
}

/// Staged writes; `None` removes the key
type Writes = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

struct StagedCells {
    keyspace: Keyspace,
    /// Everything committed before is dropped on commit
    cleared: bool,
    writes: Writes,
}

/// Uncommitted writes of one scope and its cell stores
#[derive(Default)]
struct Pending {
    meta: Writes,
    cells: HashMap<CellStoreId, StagedCells>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.cells.is_empty()
    }

    fn cells_mut(&mut self, id: CellStoreId, keyspace: &Keyspace) -> &mut StagedCells {
        self.cells.entry(id).or_insert_with(|| StagedCells {
            keyspace: keyspace.clone(),
            cleared: false,
            writes: Writes::new(),
        })
    }
}

/// Handles shared by a scope and the cell stores opened from it
#[derive(Clone)]
struct Shared {
    db: Database,
    meta: Keyspace,
    pending: Arc<Mutex<Pending>>,
}

impl Shared {
    /// Apply every staged write in one batch and sync it to disk
    fn flush(&self) -> Result<()> {
        let mut pending = self.pending.lock();
        if pending.is_empty() {
            return self.db.persist(PersistMode::SyncAll).map_err(storage_err);
        }

        let mut batch = self.db.batch();
        let mut count = 0usize;
        for (key, value) in &pending.meta {
            match value {
                Some(value) => batch.insert(&self.meta, key.clone(), value.clone()),
                None => batch.remove(&self.meta, key.clone()),
            }
            count += 1;
        }
        for staged in pending.cells.values() {
            if staged.cleared {
                for kv in staged.keyspace.iter() {
                    let key = kv.key().map_err(storage_err)?;
                    let bytes: &[u8] = key.as_ref();
                    if !staged.writes.contains_key(bytes) {
                        batch.remove(&staged.keyspace, bytes.to_vec());
                        count += 1;
                    }
                }
            }
            for (key, value) in &staged.writes {
                match value {
                    Some(value) => batch.insert(&staged.keyspace, key.clone(), value.clone()),
                    None => batch.remove(&staged.keyspace, key.clone()),
                }
                count += 1;
            }
        }

        batch.commit().map_err(storage_err)?;
        self.db.persist(PersistMode::SyncAll).map_err(storage_err)?;
        *pending = Pending::default();
        trace!(writes = count, "fjall batch committed");
        Ok(())
    }
}

/// Fjall-backed [`IndexScope`]
pub struct FjallScope {
    id: TxnId,
    base_dir: PathBuf,
    shared: Shared,
    /// Serializes read-modify-write of counters
    counters: Mutex<()>,
}

impl FjallScope {
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        let db = Database::builder(&base_dir)
            .open()
            .map_err(|e| QuarryError::Storage(format!("failed to open fjall index store: {}", e)))?;
        let meta = db
            .keyspace(META_KEYSPACE, || KeyspaceCreateOptions::default())
            .map_err(|e| QuarryError::Storage(format!("failed to open index_meta keyspace: {}", e)))?;

        Ok(Self {
            id: TxnId((1 << 63) | (LAST_SCOPE.fetch_add(1, Ordering::SeqCst) + 1)),
            base_dir,
            shared: Shared {
                db,
                meta,
                pending: Arc::new(Mutex::new(Pending::default())),
            },
            counters: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Allocate an object id for an index object stored in this scope
    pub fn create_object(&self) -> Result<ObjectId> {
        self.allocate(LAST_OBJECT_KEY)
    }

    /// Discard writes staged since the last commit
    pub fn rollback(&self) {
        *self.shared.pending.lock() = Pending::default();
    }

    /// True when writes are waiting for a commit
    pub fn has_pending(&self) -> bool {
        !self.shared.pending.lock().is_empty()
    }

    /// Bump an id counter; written through so ids survive a rollback
    fn allocate(&self, key: &[u8]) -> Result<u64> {
        let _guard = self.counters.lock();
        let next = self.read_u64(key)? + 1;
        self.shared
            .meta
            .insert(key, next.to_be_bytes())
            .map_err(storage_err)?;
        Ok(next)
    }

    fn read_u64(&self, key: &[u8]) -> Result<u64> {
        match self.shared.meta.get(key).map_err(storage_err)? {
            Some(value) => decode_u64(value.as_ref()),
            None => Ok(0),
        }
    }

    fn keyspace_name(id: CellStoreId) -> String {
        format!("cells_{}", id)
    }
}

impl IndexScope for FjallScope {
    type Cells = FjallCells;

    fn txn_id(&self) -> TxnId {
        self.id
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn get_attr(&self, object: ObjectId, attr: Atom) -> Result<Value> {
        let key = attr_key(object, attr);
        let staged = self.shared.pending.lock().meta.get(&key).cloned();
        let stored = match staged {
            Some(value) => value,
            None => self
                .shared
                .meta
                .get(&key)
                .map_err(storage_err)?
                .map(|value| value.as_ref().to_vec()),
        };
        match stored {
            Some(bytes) => Ok(Value::UInt(decode_u64(&bytes)?)),
            None => Ok(Value::Null),
        }
    }

    fn set_attr(&self, object: ObjectId, attr: Atom, value: Value) -> Result<()> {
        let staged = match value {
            Value::Null => None,
            Value::UInt(v) => Some(v.to_be_bytes().to_vec()),
            other => {
                return Err(QuarryError::Internal(format!(
                    "unsupported metadata value: {:?}",
                    other
                )))
            }
        };
        self.shared
            .pending
            .lock()
            .meta
            .insert(attr_key(object, attr), staged);
        Ok(())
    }

    fn inc_counter(&self, object: ObjectId, attr: Atom) -> Result<u32> {
        let _guard = self.counters.lock();
        let next = self
            .get_attr(object, attr)?
            .as_u32()
            .checked_add(1)
            .ok_or_else(|| QuarryError::Internal(format!("counter {attr} of object {object} exhausted")))?;
        self.set_attr(object, attr, Value::from(next))?;
        Ok(next)
    }

    fn create_cells(&self) -> Result<CellStoreId> {
        let id = CellStoreId::try_from(self.allocate(LAST_CELLS_KEY)?)
            .map_err(|_| QuarryError::Internal("cell store ids exhausted".to_string()))?;
        self.open_cells(id)?;
        debug!(cells = id, dir = %self.base_dir.display(), "fjall cell store created");
        Ok(id)
    }

    fn open_cells(&self, id: CellStoreId) -> Result<FjallCells> {
        if id == 0 || u64::from(id) > self.read_u64(LAST_CELLS_KEY)? {
            return Err(QuarryError::UnknownCellStore(id));
        }
        let keyspace = self
            .shared
            .db
            .keyspace(&Self::keyspace_name(id), || KeyspaceCreateOptions::default())
            .map_err(|e| QuarryError::Storage(format!("failed to open cells keyspace {}: {}", id, e)))?;
        Ok(FjallCells {
            id,
            keyspace,
            shared: self.shared.clone(),
        })
    }

    fn commit(&self) -> Result<()> {
        self.shared.flush()
    }
}

/// Cell store backed by one fjall keyspace
///
/// Reads see the store's own staged writes. Committing publishes everything
/// staged in the owning scope, so the term counter never lags behind the
/// dictionary on disk.
pub struct FjallCells {
    id: CellStoreId,
    keyspace: Keyspace,
    shared: Shared,
}

impl CellStore for FjallCells {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(staged) = self.shared.pending.lock().cells.get(&self.id) {
            if let Some(value) = staged.writes.get(key) {
                return Ok(value.clone());
            }
            if staged.cleared {
                return Ok(None);
            }
        }
        Ok(self
            .keyspace
            .get(key)
            .map_err(storage_err)?
            .map(|value| value.as_ref().to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let staged = (!value.is_empty()).then(|| value.to_vec());
        self.shared
            .pending
            .lock()
            .cells_mut(self.id, &self.keyspace)
            .writes
            .insert(key.to_vec(), staged);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Cell>> {
        let pending = self.shared.pending.lock();
        let staged = pending.cells.get(&self.id);

        let mut merged = BTreeMap::new();
        if !staged.is_some_and(|s| s.cleared) {
            for kv in self.keyspace.prefix(prefix) {
                let (key, value) = kv.into_inner().map_err(storage_err)?;
                merged.insert(key.as_ref().to_vec(), value.as_ref().to_vec());
            }
        }
        if let Some(staged) = staged {
            let writes = staged
                .writes
                .range(prefix.to_vec()..)
                .take_while(|(key, _)| key.starts_with(prefix));
            for (key, value) in writes {
                match value {
                    Some(value) => merged.insert(key.clone(), value.clone()),
                    None => merged.remove(key),
                };
            }
        }
        Ok(merged.into_iter().collect())
    }

    fn clear_all(&self) -> Result<()> {
        let mut pending = self.shared.pending.lock();
        let staged = pending.cells_mut(self.id, &self.keyspace);
        staged.cleared = true;
        staged.writes.clear();
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.shared.flush()
    }
}
