//! Query term syntax
//!
//! A term may end in `*` (prefix match) or `!` (exact match, no stemming).
//! With jokers enabled a single `*` anywhere in the term selects a prefix,
//! suffix or infix lookup.

/// How a term is matched against the dictionary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// One dictionary entry, stemmed when a stemmer is configured
    #[default]
    Exact,
    /// Every entry starting with the term
    Prefix,
    /// Every entry ending with the term (reverse namespace)
    Suffix,
}

/// A lower-cased term with its trailing modifier applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermPattern {
    pub term: String,
    pub mode: MatchMode,
    pub stem: bool,
}

impl TermPattern {
    pub fn parse(text: &str, mode: MatchMode) -> Self {
        let mut term = text.to_lowercase();
        let mut mode = mode;
        let mut stem = true;

        if term.ends_with('*') {
            term.pop();
            if mode == MatchMode::Exact {
                mode = MatchMode::Prefix;
            }
        } else if term.ends_with('!') {
            term.pop();
            stem = false;
            if mode == MatchMode::Prefix {
                mode = MatchMode::Exact;
            }
        }

        Self { term, mode, stem }
    }
}

/// Shape of a term split on the `*` joker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JokerPattern<'a> {
    /// No joker
    Plain(&'a str),
    /// `*` alone
    Bare,
    /// `ab*`
    Prefix(&'a str),
    /// `*cd`
    Suffix(&'a str),
    /// `ab*cd`
    Infix { prefix: &'a str, suffix: &'a str },
    /// More than one joker
    TooMany,
}

impl<'a> JokerPattern<'a> {
    pub fn parse(text: &'a str) -> Self {
        let mut parts = text.split('*');
        let first = parts.next().unwrap_or_default();
        let Some(last) = parts.next() else {
            return JokerPattern::Plain(text);
        };
        if parts.next().is_some() {
            return JokerPattern::TooMany;
        }

        match (first.is_empty(), last.is_empty()) {
            (true, true) => JokerPattern::Bare,
            (false, true) => JokerPattern::Prefix(first),
            (true, false) => JokerPattern::Suffix(last),
            (false, false) => JokerPattern::Infix {
                prefix: first,
                suffix: last,
            },
        }
    }
}
