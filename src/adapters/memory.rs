use crate::ports::DocumentStore;
use crate::types::documents::Document;

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;
use std::sync::{Arc, RwLock};

type Fields = serde_json::Map<String, serde_json::Value>;

/// Document store kept in process memory, seeded from a JSON object of the
/// form `{ "<collection>": { "<id>": { ...fields } } }`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, HashMap<String, Fields>>>>,
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seed must map collection names to objects of documents")]
    InvalidSeed,
    #[error("document {collection}/{id} is not a JSON object")]
    InvalidDocument { collection: String, id: String },
}

impl MemoryStore {
    pub fn from_json(seed: serde_json::Value) -> Result<Self, MemoryStoreError> {
        let serde_json::Value::Object(collections) = seed else {
            return Err(MemoryStoreError::InvalidSeed);
        };
        let store = MemoryStore::default();
        for (collection, documents) in collections {
            let serde_json::Value::Object(documents) = documents else {
                return Err(MemoryStoreError::InvalidSeed);
            };
            for (id, fields) in documents {
                let serde_json::Value::Object(fields) = fields else {
                    return Err(MemoryStoreError::InvalidDocument { collection, id });
                };
                store.insert(&collection, &id, fields);
            }
        }
        Ok(store)
    }

    pub fn from_file(path: &Path) -> Result<Self, MemoryStoreError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(serde_json::from_str(&contents)?)
    }

    pub fn insert(&self, collection: &str, id: &str, fields: Fields) {
        let mut guard = self.collections.write().expect("memory store lock");
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn snapshot(&self, collection: &str, id: &str) -> Option<Fields> {
        let guard = self.collections.read().expect("memory store lock");
        guard.get(collection).and_then(|docs| docs.get(id)).cloned()
    }
}

impl DocumentStore for MemoryStore {
    type Error = Infallible;
    type GetFut<'a>
        = std::future::Ready<Result<Option<Document>, Self::Error>>
    where
        Self: 'a;
    type DeleteFieldFut<'a>
        = std::future::Ready<Result<bool, Self::Error>>
    where
        Self: 'a;

    fn get<'a>(&'a self, collection: &'a str, id: &'a str) -> Self::GetFut<'a> {
        let document = self
            .snapshot(collection, id)
            .map(|fields| Document::new(id, fields));
        std::future::ready(Ok(document))
    }

    fn delete_field_if<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        field: &'a str,
        expected: &'a str,
    ) -> Self::DeleteFieldFut<'a> {
        let mut guard = self.collections.write().expect("memory store lock");
        let removed = match guard.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            Some(fields) if holds(fields, field, expected) => fields.remove(field).is_some(),
            _ => false,
        };
        std::future::ready(Ok(removed))
    }
}

fn holds(fields: &Fields, field: &str, expected: &str) -> bool {
    fields
        .get(field)
        .and_then(serde_json::Value::as_str)
        .is_some_and(|value| value.trim() == expected.trim())
}
