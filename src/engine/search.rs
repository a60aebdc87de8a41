use std::collections::BTreeSet;

use super::{Diagnostic, IndexEngine};
use crate::error::Result;
use crate::index::{collate, reverse_key, TermId};
use crate::models::{DocHit, QueryOptions};
use crate::query::{intersect, unite, HitAccumulator, JokerPattern, MatchMode, TermPattern};
use crate::store::IndexScope;

impl<S: IndexScope> IndexEngine<S> {
    /// Look up a single term
    ///
    /// A trailing `*` turns an exact lookup into a prefix lookup; a trailing
    /// `!` forces an exact lookup without stemming.
    pub fn find(&self, text: &str, mode: MatchMode) -> Result<Vec<DocHit>> {
        let Some(stores) = &self.stores else {
            return Ok(Vec::new());
        };
        let pattern = TermPattern::parse(text, mode);

        let terms: BTreeSet<TermId> = match pattern.mode {
            MatchMode::Exact => {
                let stemmer = if pattern.stem {
                    self.stemmer.as_deref()
                } else {
                    None
                };
                stores
                    .dict
                    .resolve(&pattern.term, stemmer, None)?
                    .into_iter()
                    .collect()
            }
            MatchMode::Prefix => {
                let prefix = collate(&pattern.term);
                if prefix.is_empty() {
                    return Ok(Vec::new());
                }
                stores.dict.prefix_scan(&prefix)?
            }
            MatchMode::Suffix => {
                if !self.settings.use_reverse_index {
                    self.report(Diagnostic::ReverseIndexDisabled {
                        query: text.to_string(),
                    });
                    return Ok(Vec::new());
                }
                let prefix = reverse_key(&pattern.term);
                if prefix.len() == 1 {
                    return Ok(Vec::new());
                }
                stores.dict.prefix_scan(&prefix)?
            }
        };

        let mut hits = HitAccumulator::new();
        for term in terms {
            hits.add_term(&stores.postings.scan_term(term)?);
        }
        Ok(hits.finish())
    }

    /// Look up a term that may contain one `*` joker
    ///
    /// `ab*` matches by prefix, `*cd` by suffix and `ab*cd` intersects both;
    /// item lists of the two halves are intersected when `item_and` is set.
    pub fn find_with_joker(&self, text: &str, item_and: bool, partial: bool) -> Result<Vec<DocHit>> {
        match JokerPattern::parse(text) {
            JokerPattern::Plain(term) => {
                let mode = if partial {
                    MatchMode::Prefix
                } else {
                    MatchMode::Exact
                };
                self.find(term, mode)
            }
            JokerPattern::Bare => Ok(Vec::new()),
            JokerPattern::Prefix(prefix) => self.find(prefix, MatchMode::Prefix),
            JokerPattern::Suffix(suffix) => self.find(suffix, MatchMode::Suffix),
            JokerPattern::Infix { prefix, suffix } => {
                if !self.settings.use_reverse_index {
                    self.report(Diagnostic::ReverseIndexDisabled {
                        query: text.to_string(),
                    });
                    return Ok(Vec::new());
                }
                let head = self.find(prefix, MatchMode::Prefix)?;
                if head.is_empty() {
                    return Ok(head);
                }
                let tail = self.find(suffix, MatchMode::Suffix)?;
                Ok(intersect(head, tail, !item_and))
            }
            JokerPattern::TooMany => {
                self.report(Diagnostic::TooManyJokers {
                    query: text.to_string(),
                });
                Ok(Vec::new())
            }
        }
    }

    /// Combine the hits of several terms
    pub fn find_all<T: AsRef<str>>(&self, terms: &[T], options: QueryOptions) -> Result<Vec<DocHit>> {
        let mut result: Option<Vec<DocHit>> = None;
        for term in terms {
            let term = term.as_ref();
            let hits = if options.joker {
                self.find_with_joker(term, options.item_and, options.partial)?
            } else if options.partial {
                self.find(term, MatchMode::Prefix)?
            } else {
                self.find(term, MatchMode::Exact)?
            };

            let combined = match result.take() {
                None => hits,
                Some(acc) if options.doc_and => intersect(acc, hits, !options.item_and),
                Some(acc) => unite(acc, hits, !options.item_and),
            };
            if options.doc_and && combined.is_empty() {
                return Ok(combined);
            }
            result = Some(combined);
        }
        Ok(result.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineSettings, Language};
    use crate::models::Value;
    use crate::store::{MemoryDatabase, MemoryTransaction};
    use crate::tokenizer::{LetterOrNumberTokenizer, SnowballStemmer};

    fn engine(settings: EngineSettings) -> IndexEngine<MemoryTransaction> {
        let txn = MemoryDatabase::new().begin();
        let index = txn.create_object(1).unwrap();
        let mut engine = IndexEngine::open(index, txn, None)
            .unwrap()
            .with_settings(settings);
        engine.set_tokenizer(LetterOrNumberTokenizer::new());
        engine
    }

    fn index(engine: &IndexEngine<MemoryTransaction>, object: u64, text: &str) {
        engine
            .tokenize_and_apply(&Value::from(text), object, false)
            .unwrap();
    }

    fn documents(hits: &[DocHit]) -> Vec<u64> {
        hits.iter().map(|h| h.document).collect()
    }

    #[test]
    fn test_prefix_fans_out_and_sums() {
        let engine = engine(EngineSettings::default());
        index(&engine, 1, "car cart");
        index(&engine, 2, "cartoon");
        index(&engine, 3, "dog");

        let hits = engine.find("car", MatchMode::Prefix).unwrap();
        assert_eq!(documents(&hits), vec![1, 2]);
        assert_eq!(hits[0].rank, 2);

        let hits = engine.find("car*", MatchMode::Exact).unwrap();
        assert_eq!(documents(&hits), vec![1, 2]);

        let hits = engine.find("car!", MatchMode::Prefix).unwrap();
        assert_eq!(documents(&hits), vec![1]);
        assert_eq!(hits[0].rank, 1);

        assert!(engine.find("*", MatchMode::Exact).unwrap().is_empty());
    }

    #[test]
    fn test_exact_lookup_uses_stemmer_unless_bang() {
        let mut engine = engine(EngineSettings::default());
        engine.set_stemmer(SnowballStemmer::new(Language::English));
        index(&engine, 1, "running");

        assert_eq!(documents(&engine.find("runs", MatchMode::Exact).unwrap()), vec![1]);
        assert!(engine.find("running!", MatchMode::Exact).unwrap().is_empty());
        assert_eq!(documents(&engine.find("run!", MatchMode::Exact).unwrap()), vec![1]);
    }

    #[test]
    fn test_suffix_needs_reverse_index() {
        let engine = engine(EngineSettings::default());
        index(&engine, 1, "running");
        assert!(engine.find_with_joker("*ing", false, true).unwrap().is_empty());
        assert_eq!(
            engine.take_diagnostics(),
            vec![Diagnostic::ReverseIndexDisabled {
                query: "ing".into()
            }]
        );
    }

    #[test]
    fn test_joker_shapes() {
        let engine = engine(EngineSettings::default().with_reverse_index(true));
        index(&engine, 1, "running");
        index(&engine, 2, "rung");
        index(&engine, 3, "sing");

        let suffix = engine.find_with_joker("*ing", false, true).unwrap();
        assert_eq!(documents(&suffix), vec![1, 3]);

        let infix = engine.find_with_joker("ru*ng", false, false).unwrap();
        assert_eq!(documents(&infix), vec![1, 2]);
        assert_eq!(infix[0].rank, 2);

        let prefix = engine.find_with_joker("ru*", false, false).unwrap();
        assert_eq!(documents(&prefix), vec![1, 2]);

        assert!(engine.find_with_joker("*", false, false).unwrap().is_empty());
        assert!(engine.find_with_joker("r*n*g", false, false).unwrap().is_empty());
        assert_eq!(
            engine.take_diagnostics(),
            vec![Diagnostic::TooManyJokers {
                query: "r*n*g".into()
            }]
        );
    }

    #[test]
    fn test_find_all_and_or() {
        let engine = engine(EngineSettings::default());
        index(&engine, 1, "the cat sat");
        index(&engine, 2, "the dog sat");

        let any = engine.find_all(&["cat", "dog"], QueryOptions::any()).unwrap();
        assert_eq!(documents(&any), vec![1, 2]);
        assert!(any.iter().all(|h| h.rank == 1));

        assert!(engine
            .find_all(&["cat", "dog"], QueryOptions::all())
            .unwrap()
            .is_empty());

        let both = engine.find_all(&["sat", "the"], QueryOptions::all()).unwrap();
        assert_eq!(documents(&both), vec![1, 2]);
        assert!(both.iter().all(|h| h.rank == 2));

        let none: [&str; 0] = [];
        assert!(engine.find_all(&none, QueryOptions::any()).unwrap().is_empty());
    }
}
