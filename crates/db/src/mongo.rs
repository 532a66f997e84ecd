//! MongoDB backend. Ids are `ObjectId` hex strings.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document as BsonDocument},
    options::ReturnDocument,
    Client, Collection, Database,
};

use crate::{Document, DocumentStore, Record, StoreError, StoreResult};

pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Create a client for `uri` and bind it to database `name`. The driver
    /// connects lazily; call [`DocumentStore::ping`] to verify reachability.
    pub async fn connect(uri: &str, name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .with_context(|| format!("failed to create MongoDB client for '{uri}'"))?;
        let database = client.database(name);

        Ok(Self { client, database })
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection(name)
    }

    fn parse_id(id: &str) -> StoreResult<ObjectId> {
        ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
    }

    fn to_bson(fields: &Document) -> StoreResult<BsonDocument> {
        bson::to_document(fields).map_err(backend_error)
    }

    /// Split the `_id` key off a raw document and render the rest as JSON.
    fn to_record(mut raw: BsonDocument) -> StoreResult<Record> {
        let id = raw
            .remove("_id")
            .and_then(|value| value.as_object_id())
            .ok_or_else(|| StoreError::Backend(anyhow!("document without an ObjectId key")))?;

        match Bson::Document(raw).into_relaxed_extjson() {
            serde_json::Value::Object(fields) => Ok(Record {
                id: id.to_hex(),
                fields,
            }),
            other => Err(StoreError::Backend(anyhow!(
                "unexpected document shape: {other}"
            ))),
        }
    }
}

fn backend_error(err: impl Into<anyhow::Error>) -> StoreError {
    StoreError::Backend(err.into())
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(backend_error)
    }

    async fn insert(&self, collection: &str, fields: Document) -> StoreResult<Record> {
        let raw = Self::to_bson(&fields)?;
        let result = self
            .collection(collection)
            .insert_one(&raw)
            .await
            .map_err(backend_error)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend(anyhow!("server assigned a non-ObjectId key")))?;

        Ok(Record {
            id: id.to_hex(),
            fields,
        })
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let mut cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(backend_error)?;

        let mut records = Vec::new();
        while cursor.advance().await.map_err(backend_error)? {
            let raw = cursor.deserialize_current().map_err(backend_error)?;
            records.push(Self::to_record(raw)?);
        }

        Ok(records)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        let oid = Self::parse_id(id)?;

        self.collection(collection)
            .find_one(doc! { "_id": oid })
            .await
            .map_err(backend_error)?
            .map(Self::to_record)
            .transpose()
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<Record>> {
        let oid = Self::parse_id(id)?;

        // `$set` with an empty document is rejected by the server.
        if fields.is_empty() {
            return self.find_by_id(collection, id).await;
        }

        let changes = Self::to_bson(&fields)?;
        self.collection(collection)
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await
            .map_err(backend_error)?
            .map(Self::to_record)
            .transpose()
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let oid = Self::parse_id(id)?;

        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(backend_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn close(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        tracing::info!(target: "catalog-db", "MongoDB client shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_object_ids() {
        assert!(matches!(
            MongoStore::parse_id("123"),
            Err(StoreError::InvalidId(id)) if id == "123"
        ));
        assert!(MongoStore::parse_id("65f1c0ffee0000000000beef").is_ok());
    }

    #[test]
    fn to_record_strips_internal_key() {
        let oid = ObjectId::new();
        let raw = doc! { "_id": oid, "title": "1984", "publishedYear": 1949 };

        let record = MongoStore::to_record(raw).unwrap();

        assert_eq!(record.id, oid.to_hex());
        assert!(!record.fields.contains_key("_id"));
        assert_eq!(record.fields["title"], "1984");
        assert_eq!(record.fields["publishedYear"], 1949);
    }

    #[test]
    fn to_record_requires_object_id() {
        let raw = doc! { "_id": "plain-string", "title": "1984" };
        assert!(matches!(
            MongoStore::to_record(raw),
            Err(StoreError::Backend(_))
        ));
    }
}
