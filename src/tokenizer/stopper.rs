use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

use crate::config::Language;

/// Decides whether a token is excluded from indexing
pub trait Stopper: Send + Sync {
    fn is_stopword(&self, term: &str) -> bool;
}

/// Stopword set, matched against lower-cased tokens
#[derive(Clone, Debug, Default)]
pub struct StopWordList {
    words: HashSet<String>,
}

impl StopWordList {
    /// Stopword list shipped for `language`
    pub fn for_language(language: Language) -> Self {
        let lang = match language {
            Language::English => LANGUAGE::English,
            Language::German => LANGUAGE::German,
            Language::French => LANGUAGE::French,
            Language::Spanish => LANGUAGE::Spanish,
            Language::Italian => LANGUAGE::Italian,
            Language::Dutch => LANGUAGE::Dutch,
            Language::Portuguese => LANGUAGE::Portuguese,
            Language::Russian => LANGUAGE::Russian,
        };
        Self {
            words: get(lang).into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|s| s.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Stopper for StopWordList {
    fn is_stopword(&self, term: &str) -> bool {
        self.words.contains(term)
    }
}
