use crate::models::{DocumentId, ObjectId};

/// Maps an indexed object to the document it belongs to
///
/// `None` means the object is its own document.
pub trait DocumentResolver: Send + Sync {
    fn resolve(&self, object: ObjectId) -> Option<DocumentId>;
}

impl<F> DocumentResolver for F
where
    F: Fn(ObjectId) -> Option<DocumentId> + Send + Sync,
{
    fn resolve(&self, object: ObjectId) -> Option<DocumentId> {
        self(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_resolver() {
        let resolver = |object: ObjectId| (object > 100).then_some(object / 100);
        assert_eq!(resolver.resolve(5), None);
        assert_eq!(resolver.resolve(301), Some(3));
    }
}
