use crate::types::documents::Document;

pub trait DocumentStore: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type GetFut<'a>: Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a
    where
        Self: 'a;
    type DeleteFieldFut<'a>: Future<Output = Result<bool, Self::Error>> + Send + 'a
    where
        Self: 'a;

    /// Reads `collection/id`. A missing document is `Ok(None)`, not an error.
    fn get<'a>(&'a self, collection: &'a str, id: &'a str) -> Self::GetFut<'a>;

    /// Removes `field` from `collection/id` only while it still holds the
    /// string `expected` (ignoring surrounding whitespace). Returns whether
    /// the field was removed.
    fn delete_field_if<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        field: &'a str,
        expected: &'a str,
    ) -> Self::DeleteFieldFut<'a>;
}
