//! Session hand-off of generated schemas between views.
//!
//! A schema is written as JSON under `schema-<id>` in a string key/value
//! store, the same shape the browser keeps in session storage.

use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::schema::Schema;

const SLOT_PREFIX: &str = "schema-";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored schema under {key} is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key/value storage scoped to one browsing session.
pub trait SchemaStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl SchemaStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

pub fn slot_key(id: &str) -> String {
    format!("{}{}", SLOT_PREFIX, id)
}

/// Typed access to schema slots over any [`SchemaStore`].
#[derive(Debug, Default)]
pub struct SchemaSlots<S> {
    store: S,
}

impl<S: SchemaStore> SchemaSlots<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Store under a fresh id and return it.
    pub fn save(&mut self, schema: &Schema) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.save_as(&id, schema)?;
        Ok(id)
    }

    pub fn save_as(&mut self, id: &str, schema: &Schema) -> Result<(), StoreError> {
        let json = serde_json::to_string(schema)?;
        self.store.set(&slot_key(id), json);
        tracing::debug!(%id, tables = schema.tables.len(), "stored schema");
        Ok(())
    }

    /// `Ok(None)` for an empty slot, an error when the slot holds something unreadable.
    pub fn load(&self, id: &str) -> Result<Option<Schema>, StoreError> {
        let key = slot_key(id);
        let Some(json) = self.store.get(&key) else {
            return Ok(None);
        };

        serde_json::from_str(&json).map(Some).map_err(|source| {
            tracing::warn!(%key, error = %source, "stored schema is malformed");
            StoreError::Malformed { key, source }
        })
    }

    pub fn discard(&mut self, id: &str) {
        self.store.remove(&slot_key(id));
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::RegexDdlParser;

    fn schema() -> Schema {
        Schema::from_ddl(
            "Blog",
            "posts and authors",
            "CREATE TABLE authors (id INT PRIMARY KEY);\nCREATE TABLE posts (id INT PRIMARY KEY, author_id INT REFERENCES authors(id));",
            &RegexDdlParser::default(),
        )
    }

    #[test]
    fn test_save_and_load() {
        let mut slots = SchemaSlots::new(MemoryStore::default());
        let id = slots.save(&schema()).unwrap();

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(slots.load(&id).unwrap(), Some(schema()));
    }

    #[test]
    fn test_slot_key() {
        let mut slots = SchemaSlots::new(MemoryStore::default());
        slots.save_as("42", &schema()).unwrap();

        let store = slots.into_inner();
        let raw = store.get("schema-42").unwrap();
        assert!(raw.contains("\"fromColumn\":\"author_id\""));
    }

    #[test]
    fn test_missing_slot() {
        let slots = SchemaSlots::new(MemoryStore::default());
        assert!(slots.load("nope").unwrap().is_none());
    }

    #[test]
    fn test_malformed_slot() {
        let mut store = MemoryStore::default();
        store.set("schema-bad", "{not json".to_string());
        let slots = SchemaSlots::new(store);

        match slots.load("bad") {
            Err(StoreError::Malformed { key, .. }) => assert_eq!(key, "schema-bad"),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_discard() {
        let mut slots = SchemaSlots::new(MemoryStore::default());
        slots.save_as("x", &schema()).unwrap();
        slots.discard("x");
        assert!(slots.load("x").unwrap().is_none());
    }
}
