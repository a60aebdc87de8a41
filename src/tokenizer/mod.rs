//! Text analysis capabilities
//!
//! The engine only orchestrates these: a [`Tokenizer`] produces lower-cased
//! tokens, a [`Stopper`] drops some of them and a [`Stemmer`] normalizes the
//! rest before they reach the term dictionary. A [`DocumentResolver`] decides
//! which document an indexed object counts towards. Each is a narrow trait so
//! callers can plug in their own implementations.

mod resolver;
mod stemmer;
mod stopper;
#[allow(clippy::module_inception)]
mod tokenizer;

pub use resolver::DocumentResolver;
pub use stemmer::{SnowballStemmer, Stemmer};
pub use stopper::{StopWordList, Stopper};
pub use tokenizer::{LetterOrNumberTokenizer, Tokenizer, UnicodeWordTokenizer};

use crate::config::{TokenizerConfig, TokenizerKind};

/// Capabilities built from a [`TokenizerConfig`]
pub struct Analysis {
    pub tokenizer: Box<dyn Tokenizer>,
    pub stemmer: Option<Box<dyn Stemmer>>,
    pub stopper: Option<Box<dyn Stopper>>,
}

impl Analysis {
    pub fn from_config(config: &TokenizerConfig) -> Self {
        let tokenizer: Box<dyn Tokenizer> = match config.kind {
            TokenizerKind::LetterOrNumber => Box::new(LetterOrNumberTokenizer::from_config(config)),
            TokenizerKind::UnicodeWords => Box::new(UnicodeWordTokenizer::from_config(config)),
        };

        let stemmer: Option<Box<dyn Stemmer>> = if config.stem {
            Some(Box::new(SnowballStemmer::new(config.language)))
        } else {
            None
        };

        let stopper: Option<Box<dyn Stopper>> = if config.remove_stopwords {
            Some(Box::new(StopWordList::for_language(config.language)))
        } else {
            None
        };

        Self {
            tokenizer,
            stemmer,
            stopper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_from_default_config() {
        let analysis = Analysis::from_config(&TokenizerConfig::default());
        assert!(analysis.stemmer.is_none());
        assert!(analysis.stopper.is_none());

        let tokens: Vec<String> = analysis.tokenizer.tokens("The Cat sat").collect();
        assert_eq!(tokens, vec!["the", "cat", "sat"]);
    }

    #[test]
    fn test_analysis_with_stemming_and_stopwords() {
        let config = TokenizerConfig {
            stem: true,
            remove_stopwords: true,
            ..Default::default()
        };
        let analysis = Analysis::from_config(&config);

        let stemmer = analysis.stemmer.as_ref().unwrap();
        assert_eq!(stemmer.stem("running"), "run");
        assert!(analysis.stopper.as_ref().unwrap().is_stopword("the"));
    }
}
