use serde::{Deserialize, Serialize};

/// Engine behaviour toggles
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maintain the reversed-term namespace needed for leading wildcards
    pub use_reverse_index: bool,
    /// Resolve indexed objects to their owning document and keep item postings
    pub resolve_documents: bool,
    /// Skip change notifications while the index is empty.
    /// `None` enables it exactly when the index lives in a separate transaction.
    pub check_empty: Option<bool>,
}

impl EngineSettings {
    pub fn with_reverse_index(mut self, on: bool) -> Self {
        self.use_reverse_index = on;
        self
    }

    pub fn with_resolve_documents(mut self, on: bool) -> Self {
        self.resolve_documents = on;
        self
    }

    pub fn with_check_empty(mut self, on: bool) -> Self {
        self.check_empty = Some(on);
        self
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub kind: TokenizerKind,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: Language,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::LetterOrNumber,
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            max_token_length: 64,
            language: Language::English,
        }
    }
}

/// How text is split into tokens
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// Maximal runs of letters and digits
    #[default]
    LetterOrNumber,
    /// Unicode word boundaries (UAX #29)
    UnicodeWords,
}

/// Language used for stemming and stopword lists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Spanish,
    Italian,
    Dutch,
    Portuguese,
    Russian,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let settings = EngineSettings::default();
        assert!(!settings.use_reverse_index);
        assert!(!settings.resolve_documents);
        assert_eq!(settings.check_empty, None);

        let tokenizer_config = TokenizerConfig::default();
        assert_eq!(tokenizer_config.kind, TokenizerKind::LetterOrNumber);
        assert!(!tokenizer_config.remove_stopwords);
        assert!(!tokenizer_config.stem);
    }

    #[test]
    fn test_settings_builder() {
        let settings = EngineSettings::default()
            .with_reverse_index(true)
            .with_check_empty(false);
        assert!(settings.use_reverse_index);
        assert_eq!(settings.check_empty, Some(false));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TokenizerConfig =
            serde_json::from_str(r#"{ "language": "german", "stem": true }"#).unwrap();
        assert_eq!(config.language, Language::German);
        assert!(config.stem);
        assert_eq!(config.max_token_length, 64);

        let settings: EngineSettings =
            serde_json::from_str(r#"{ "use_reverse_index": true }"#).unwrap();
        assert!(settings.use_reverse_index);
        assert_eq!(settings.check_empty, None);
    }
}
