pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod models;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use config::{EngineSettings, Language, TokenizerConfig, TokenizerKind};
pub use engine::{Diagnostic, EngineRegistry, IndexEngine, SharedEngine, Violation, WatchSet};
pub use error::{QuarryError, Result};
pub use index::{IndexStats, TermId};
pub use models::*;
pub use query::MatchMode;
pub use store::{ChangeView, IndexScope, MemoryDatabase, MemoryTransaction, PreCommitObserver};
pub use tokenizer::{DocumentResolver, Stemmer, Stopper, Tokenizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
