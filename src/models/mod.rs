pub mod object;
pub mod search;

pub use object::{Atom, DocumentId, ItemId, ObjectId, TxnId, Value};
pub use search::{DocHit, ItemHit, QueryOptions};
