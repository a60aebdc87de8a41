use std::fmt;

use crate::index::PostingKey;
use crate::models::ObjectId;

/// Non-fatal condition raised while indexing or querying
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// Query term with more than one `*`
    TooManyJokers { query: String },
    /// Leading joker while the reverse index is off
    ReverseIndexDisabled { query: String },
    /// Indexing attempted without a tokenizer
    MissingTokenizer { object: ObjectId },
    /// Increment skipped on a posting already at the maximum frequency
    FrequencyOverflow { key: PostingKey },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TooManyJokers { query } => {
                write!(f, "only one joker is supported: {:?}", query)
            }
            Diagnostic::ReverseIndexDisabled { query } => {
                write!(f, "leading joker needs the reverse index: {:?}", query)
            }
            Diagnostic::MissingTokenizer { object } => {
                write!(f, "no tokenizer configured, object {} not indexed", object)
            }
            Diagnostic::FrequencyOverflow { key } => write!(
                f,
                "frequency overflow for {} in document {}{}",
                key.term,
                key.document,
                key.item.map(|i| format!(" item {}", i)).unwrap_or_default()
            ),
        }
    }
}
