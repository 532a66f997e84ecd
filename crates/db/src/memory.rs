//! Process-local backend used for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Document, DocumentStore, Record, StoreError, StoreResult};

/// Collections kept in insertion order. Ids are UUIDv7 and never reissued.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_id(id: &str) -> StoreResult<String> {
        Uuid::parse_str(id)
            .map(|uuid| uuid.to_string())
            .map_err(|_| StoreError::InvalidId(id.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert(&self, collection: &str, fields: Document) -> StoreResult<Record> {
        let record = Record {
            id: Uuid::now_v7().to_string(),
            fields,
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        let id = Self::parse_id(id)?;
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .and_then(|records| records.iter().find(|record| record.id == id))
            .cloned())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<Record>> {
        let id = Self::parse_id(id)?;
        let mut collections = self.collections.write().await;

        let Some(record) = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|record| record.id == id))
        else {
            return Ok(None);
        };

        record.fields.extend(fields);
        Ok(Some(record.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let id = Self::parse_id(id)?;
        let mut collections = self.collections.write().await;

        let Some(records) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() < before)
    }
}
