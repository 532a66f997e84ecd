//! Document store abstraction for the catalog.
//!
//! Records are schema-flexible JSON objects addressed by an identifier the
//! store generates. Each backend decides what a syntactically valid id looks
//! like and reports anything else as [`StoreError::InvalidId`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Field set of a stored document, without its identifier.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Shared handle to whichever backend was selected at startup.
pub type SharedStore = Arc<dyn DocumentStore>;

pub type StoreResult<T> = Result<T, StoreError>;

/// A document together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Document,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("malformed record id '{0}'")]
    InvalidId(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Storage contract consumed by resource services.
///
/// Every call is atomic per record. Callers never see the backend's internal
/// key name; ids travel as plain strings.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;

    /// Round-trip to the backend to confirm it is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Persist a new document and return it with its generated id.
    async fn insert(&self, collection: &str, fields: Document) -> StoreResult<Record>;

    /// All documents of a collection in the backend's natural order.
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Record>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Record>>;

    /// Overwrite the given top-level fields and return the updated document.
    /// An empty field set leaves the document untouched.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<Record>>;

    /// Returns true if a document was removed.
    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// Release connections held by the backend.
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Which backend to construct.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Mongo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "DatabaseSettings::default_uri")]
    pub uri: String,
    #[serde(default = "DatabaseSettings::default_name")]
    pub name: String,
}

impl DatabaseSettings {
    fn default_uri() -> String {
        "mongodb://127.0.0.1:27017".to_string()
    }

    fn default_name() -> String {
        "catalog".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            uri: Self::default_uri(),
            name: Self::default_name(),
        }
    }
}

/// Build the configured backend. Remote backends are pinged before returning
/// so a bad address fails at startup rather than on the first request.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match settings.backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::Mongo => Arc::new(MongoStore::connect(&settings.uri, &settings.name).await?),
    };

    store
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("document store is not reachable: {e}"))?;

    tracing::info!(
        target: "catalog-db",
        backend = store.backend(),
        database = %settings.name,
        "document store connected"
    );

    Ok(store)
}
