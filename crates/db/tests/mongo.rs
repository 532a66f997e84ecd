//! Round trip against a live MongoDB.
//!
//! Run with: CATALOG_TEST_MONGO_URI=mongodb://127.0.0.1:27017 cargo test -p catalog-db -- --ignored

use catalog_db::{DocumentStore, MongoStore, StoreError};
use serde_json::json;

#[tokio::test]
#[ignore]
async fn mongo_crud_cycle() -> anyhow::Result<()> {
    let Ok(uri) = std::env::var("CATALOG_TEST_MONGO_URI") else {
        eprintln!("CATALOG_TEST_MONGO_URI missing; skipping");
        return Ok(());
    };

    let store = MongoStore::connect(&uri, "catalog_test").await?;
    store.ping().await?;

    let collection = format!("books_{}", uuid::Uuid::new_v4().simple());
    let fields = json!({"title": "1984", "author": "George Orwell"})
        .as_object()
        .cloned()
        .unwrap_or_default();

    let created = store.insert(&collection, fields).await?;
    assert_eq!(store.find_all(&collection).await?.len(), 1);

    let patch = json!({"title": "Animal Farm"}).as_object().cloned().unwrap_or_default();
    let updated = store
        .update_by_id(&collection, &created.id, patch)
        .await?
        .expect("record should exist");
    assert_eq!(updated.fields["title"], "Animal Farm");
    assert_eq!(updated.fields["author"], "George Orwell");

    assert!(store.delete_by_id(&collection, &created.id).await?);
    assert!(!store.delete_by_id(&collection, &created.id).await?);
    assert!(matches!(
        store.find_by_id(&collection, "nope").await,
        Err(StoreError::InvalidId(_))
    ));

    store.close().await?;
    Ok(())
}
