use super::{Diagnostic, IndexEngine, IndexStores};
use crate::error::Result;
use crate::index::{FrequencyUpdate, PostingKey, TermCreation};
use crate::models::{DocumentId, ObjectId, Value};
use crate::store::{IndexScope, ObjectSource};

impl<S: IndexScope> IndexEngine<S> {
    /// Document an object's postings are recorded under
    pub fn resolve_document(&self, object: ObjectId) -> DocumentId {
        if !self.settings.resolve_documents {
            return object;
        }
        self.resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(object))
            .unwrap_or(object)
    }

    /// Record (or withdraw) one occurrence of `term` in `object`
    ///
    /// Removal never creates a term; removing an unknown term does nothing.
    pub fn apply_occurrence(&self, term: &str, object: ObjectId, remove: bool) -> Result<()> {
        let Some(stores) = &self.stores else {
            return Ok(());
        };

        let creation = TermCreation {
            allocator: self,
            reverse: self.settings.use_reverse_index,
        };
        let create = (!remove).then_some(&creation);
        let Some(term) = stores.dict.resolve(term, self.stemmer.as_deref(), create)? else {
            return Ok(());
        };

        let document = self.resolve_document(object);
        self.adjust(stores, PostingKey::document(term, document), remove)?;
        if document != object {
            self.adjust(stores, PostingKey::item(term, document, object), remove)?;
        }
        Ok(())
    }

    fn adjust(&self, stores: &IndexStores<S::Cells>, key: PostingKey, remove: bool) -> Result<()> {
        if stores.postings.adjust(&key, remove)? == FrequencyUpdate::Saturated {
            self.report(Diagnostic::FrequencyOverflow { key });
        }
        Ok(())
    }

    /// Tokenize `value` and apply every token that is not a stopword
    pub fn tokenize_and_apply(&self, value: &Value, object: ObjectId, remove: bool) -> Result<()> {
        let Some(tokenizer) = &self.tokenizer else {
            self.report(Diagnostic::MissingTokenizer { object });
            return Ok(());
        };

        let text = value.to_text();
        for token in tokenizer.tokens(&text) {
            if self
                .stopper
                .as_ref()
                .is_some_and(|stopper| stopper.is_stopword(&token))
            {
                continue;
            }
            self.apply_occurrence(&token, object, remove)?;
        }
        Ok(())
    }

    /// Index the watched attributes of `object`
    ///
    /// With `remove_old_values`, the previously committed values are
    /// withdrawn first.
    pub fn index_object<O>(&self, source: &O, object: ObjectId, remove_old_values: bool) -> Result<()>
    where
        O: ObjectSource + ?Sized,
    {
        for attr in self.watch.attributes() {
            if remove_old_values {
                let old = source.value(object, attr, true);
                if !old.is_null() {
                    self.tokenize_and_apply(&old, object, true)?;
                }
            }
            let current = source.value(object, attr, false);
            if !current.is_null() {
                self.tokenize_and_apply(&current, object, false)?;
            }
        }
        Ok(())
    }

    /// Withdraw the current values of the watched attributes of `object`
    pub fn unindex_object<O>(&self, source: &O, object: ObjectId) -> Result<()>
    where
        O: ObjectSource + ?Sized,
    {
        for attr in self.watch.attributes() {
            let current = source.value(object, attr, false);
            if !current.is_null() {
                self.tokenize_and_apply(&current, object, true)?;
            }
        }
        Ok(())
    }
}
