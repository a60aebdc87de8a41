use rust_stemmers::{Algorithm, Stemmer as Snowball};

use crate::config::Language;

/// Reduces a term to its stem
///
/// Implementations must be pure and idempotent: `stem(stem(x)) == stem(x)`.
pub trait Stemmer: Send + Sync {
    fn stem(&self, term: &str) -> String;
}

/// Snowball stemmer for one language
pub struct SnowballStemmer {
    language: Language,
    inner: Snowball,
}

impl SnowballStemmer {
    pub fn new(language: Language) -> Self {
        let algorithm = match language {
            Language::English => Algorithm::English,
            Language::German => Algorithm::German,
            Language::French => Algorithm::French,
            Language::Spanish => Algorithm::Spanish,
            Language::Italian => Algorithm::Italian,
            Language::Dutch => Algorithm::Dutch,
            Language::Portuguese => Algorithm::Portuguese,
            Language::Russian => Algorithm::Russian,
        };
        Self {
            language,
            inner: Snowball::create(algorithm),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, term: &str) -> String {
        self.inner.stem(term).into_owned()
    }
}
