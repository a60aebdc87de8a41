use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an object in the host store (0 is the null object)
pub type ObjectId = u64;

/// Identifier of an object type or attribute in the host store
pub type Atom = u32;

/// Object a piece of text was found in; the unit returned as a document hit
pub type DocumentId = ObjectId;

/// Sub-document object hit independently of its owning document
pub type ItemId = ObjectId;

/// Identifier of a transaction (transactional scope) of the host store
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxnId(pub u64);

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn#{}", self.0)
    }
}

/// Attribute value as stored in the host store
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Text(String),
    Object(ObjectId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text representation fed to the tokenizer
    ///
    /// Object references and nulls carry no searchable text.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null | Value::Object(_) => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Interpret the value as an unsigned 32-bit number (metadata attributes)
    pub fn as_u32(&self) -> u32 {
        match self {
            Value::UInt(u) => u32::try_from(*u).unwrap_or(0),
            Value::Int(i) => u32::try_from(*i).unwrap_or(0),
            _ => 0,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v as u64)
    }
}
