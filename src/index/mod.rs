//! Persistent inverted index structures
//!
//! - `key`: order-preserving encoding of numbers and posting keys
//! - `collate`: canonical dictionary keys for terms
//! - `TermDictionary`: term to [`TermId`] mapping plus the reverse namespace
//! - `PostingStore`: per-term frequencies at document and item level

mod types;
mod collate;
mod key;
mod term_dict;
mod postings;

pub use types::*;
pub use collate::*;
pub use key::*;
pub use term_dict::*;
pub use postings::*;
