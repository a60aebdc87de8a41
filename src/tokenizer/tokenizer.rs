use unicode_segmentation::UnicodeSegmentation;

use crate::config::TokenizerConfig;

/// Splits text into lower-cased tokens
///
/// Every call to [`Tokenizer::tokens`] starts a fresh, finite sequence over
/// the given text; tokens are produced lazily.
pub trait Tokenizer: Send + Sync {
    fn tokens<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a>;
}

/// Token length bounds, counted in characters
#[derive(Clone, Copy, Debug)]
struct LengthBounds {
    min: usize,
    max: usize,
}

impl LengthBounds {
    fn from_config(config: &TokenizerConfig) -> Self {
        Self {
            min: config.min_token_length.max(1),
            max: config.max_token_length.max(1),
        }
    }

    fn accepts(&self, token: &str) -> bool {
        let len = token.chars().count();
        len >= self.min && len <= self.max
    }
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self {
            min: 1,
            max: usize::MAX,
        }
    }
}

/// Tokens are maximal runs of letters and digits; everything else separates
#[derive(Clone, Debug, Default)]
pub struct LetterOrNumberTokenizer {
    bounds: LengthBounds,
}

impl LetterOrNumberTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TokenizerConfig) -> Self {
        Self {
            bounds: LengthBounds::from_config(config),
        }
    }

    /// Collect all tokens of `text`
    pub fn parse(&self, text: &str) -> Vec<String> {
        self.tokens(text).collect()
    }
}

impl Tokenizer for LetterOrNumberTokenizer {
    fn tokens<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(
            text.split(|c: char| !c.is_alphanumeric())
                .filter(|word| !word.is_empty())
                .map(str::to_lowercase)
                .filter(move |token| self.bounds.accepts(token)),
        )
    }
}

/// Tokens are Unicode words (UAX #29 word boundaries)
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer {
    bounds: LengthBounds,
}

impl UnicodeWordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TokenizerConfig) -> Self {
        Self {
            bounds: LengthBounds::from_config(config),
        }
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokens<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(
            text.unicode_words()
                .map(str::to_lowercase)
                .filter(move |token| self.bounds.accepts(token)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerKind;

    #[test]
    fn test_letter_or_number_tokenization() {
        let tokenizer = LetterOrNumberTokenizer::new();
        let tokens = tokenizer.parse("Hello, World! x2y  --über");

        assert_eq!(tokens, vec!["hello", "world", "x2y", "über"]);
    }

    #[test]
    fn test_tokens_restart_per_call() {
        let tokenizer = LetterOrNumberTokenizer::new();
        assert_eq!(tokenizer.parse("one two"), vec!["one", "two"]);
        assert_eq!(tokenizer.parse("three"), vec!["three"]);
        assert!(tokenizer.parse("  ...  ").is_empty());
    }

    #[test]
    fn test_unicode_word_tokenization() {
        let tokenizer = UnicodeWordTokenizer::new();
        let tokens: Vec<String> = tokenizer.tokens("The quick (\"brown\") fox can't").collect();

        assert!(tokens.contains(&"the".to_string()));
        assert!(tokens.contains(&"brown".to_string()));
        assert!(tokens.contains(&"can't".to_string()));
    }

    #[test]
    fn test_min_max_token_length() {
        let config = TokenizerConfig {
            kind: TokenizerKind::LetterOrNumber,
            min_token_length: 3,
            max_token_length: 5,
            ..Default::default()
        };

        let tokenizer = LetterOrNumberTokenizer::from_config(&config);
        let tokens = tokenizer.parse("a ab abc abcd abcde abcdef");

        assert_eq!(tokens, vec!["abc", "abcd", "abcde"]);
    }
}
