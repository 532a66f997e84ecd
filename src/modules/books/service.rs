//! Validation and persistence rules for the Book resource.

use catalog_db::{SharedStore, StoreError};
use thiserror::Error;

use super::models::{Book, BookPatch, FieldError, NewBook};
use crate::utils;

/// Collection the books live in.
pub const COLLECTION: &str = "books";

#[derive(Error, Debug)]
pub enum BookError {
    #[error("invalid book: {} field(s) rejected", .0.len())]
    InvalidInput(Vec<FieldError>),

    /// Also raised for ids the store cannot parse.
    #[error("book '{0}' not found")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for BookError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(id) => BookError::NotFound(id),
            other => BookError::Storage(other),
        }
    }
}

/// Book operations over an injected document store. Holds no state of its own.
#[derive(Clone)]
pub struct BookService {
    store: SharedStore,
}

impl BookService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn ping(&self) -> Result<(), BookError> {
        self.store.ping().await.map_err(BookError::Storage)
    }

    pub async fn create(&self, input: NewBook) -> Result<Book, BookError> {
        let fields = input
            .validated(utils::current_year())
            .map_err(BookError::InvalidInput)?;

        let record = self.store.insert(COLLECTION, fields.into_document()).await?;
        let book = to_book(record)?;

        tracing::info!(book_id = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        self.store
            .find_all(COLLECTION)
            .await?
            .into_iter()
            .map(to_book)
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Book, BookError> {
        match self.store.find_by_id(COLLECTION, id).await? {
            Some(record) => to_book(record),
            None => Err(BookError::NotFound(id.to_string())),
        }
    }

    /// Partial update: only supplied fields change, each validated on its own.
    /// A missing book is reported before the payload is looked at.
    pub async fn update(&self, id: &str, patch: BookPatch) -> Result<Book, BookError> {
        let current = self.get(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let patch = patch
            .validated(utils::current_year())
            .map_err(BookError::InvalidInput)?;

        let record = self
            .store
            .update_by_id(COLLECTION, id, patch.into_document())
            .await?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        let book = to_book(record)?;

        tracing::info!(book_id = %book.id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BookError> {
        if !self.store.delete_by_id(COLLECTION, id).await? {
            return Err(BookError::NotFound(id.to_string()));
        }

        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }
}

fn to_book(record: catalog_db::Record) -> Result<Book, BookError> {
    let id = record.id.clone();
    Book::try_from(record).map_err(|e| {
        BookError::Storage(StoreError::Backend(anyhow::anyhow!(
            "stored book '{id}' is malformed: {e}"
        )))
    })
}
