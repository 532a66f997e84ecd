//! JSON API for the Books module, mounted under `/api/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_http::error::AppError;
use serde_json::json;

use super::models::{Book, BookPatch, DeleteConfirmation, NewBook};
use super::service::{BookError, BookService};
use super::views;

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::InvalidInput(errors) => {
                let details = errors
                    .iter()
                    .map(|e| json!({ "field": e.field, "error": e.error }))
                    .collect();
                AppError::validation(details, "book failed validation")
            }
            BookError::NotFound(_) => AppError::not_found("Book not found"),
            BookError::Storage(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

/// Store-backed health check
async fn health_check(State(service): State<BookService>) -> Result<&'static str, AppError> {
    service.ping().await?;
    Ok("books module is healthy")
}

/// JSON by default; book cards when the client asks for HTML.
async fn list_books(State(service): State<BookService>, headers: HeaderMap) -> Response {
    let html = views::wants_html(&headers);

    match service.list().await {
        Ok(books) if html => views::book_list_page(&books).into_response(),
        Ok(books) => Json(books).into_response(),
        Err(err) if html => views::error_page(err),
        Err(err) => AppError::from(err).into_response(),
    }
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.get(&id).await?))
}

async fn create_book(
    State(service): State<BookService>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(input) = payload?;
    let book = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let patch = match payload {
        Ok(Json(patch)) => patch,
        Err(rejection) => {
            // An unknown id wins over a bad body.
            service.get(&id).await?;
            return Err(rejection.into());
        }
    };

    Ok(Json(service.update(&id, patch).await?))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, AppError> {
    service.delete(&id).await?;
    Ok(Json(DeleteConfirmation {
        message: "Book deleted".to_string(),
    }))
}
