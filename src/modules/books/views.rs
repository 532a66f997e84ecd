//! Server-rendered pages for browsers. Everything here goes through
//! [`BookService`]; nothing touches the store directly.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use super::models::{Book, BookPatch, FieldError, NewBook};
use super::service::{BookError, BookService};
use crate::utils::escape_html;

/// Where successful form posts land.
const LIST_PATH: &str = "/api/books";

const STYLE: &str = r#"
        body { font-family: "Segoe UI", sans-serif; background: #f4f4f4; padding: 40px; }
        h1 { color: #2c3e50; }
        a { color: #007bff; font-weight: bold; text-decoration: none; }
        .card { background: white; padding: 20px; margin-bottom: 20px; border-radius: 12px;
                box-shadow: 0 4px 12px rgba(0,0,0,0.1); max-width: 600px; }
        .actions form { display: inline-block; margin-right: 8px; }
        .danger { background: #dc3545; color: white; padding: 8px; border: none; border-radius: 4px; }
        .primary { background: #007bff; color: white; padding: 8px; border: none; border-radius: 4px; }
        label { display: block; margin-top: 12px; }
        input { width: 100%; padding: 6px; }
        .errors { color: #dc3545; }
"#;

/// True when the `Accept` header asks for HTML and not JSON. Clients that
/// send no preference get JSON.
pub fn wants_html(headers: &HeaderMap) -> bool {
    let Some(accept) = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    accept.contains("text/html") && !accept.contains("application/json")
}

pub fn pages(service: BookService) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/add-book", get(add_form).post(add_book))
        .route("/edit-book/{id}", get(edit_form).post(edit_book))
        .route("/delete-book/{id}", post(delete_book))
        .with_state(service)
}

/// Raw form fields. Everything arrives as text, so the year is parsed here.
#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default, rename = "publishedYear")]
    pub published_year: String,
}

impl BookForm {
    fn parse_year(raw: &str) -> Result<i32, BookError> {
        raw.trim().parse().map_err(|_| {
            BookError::InvalidInput(vec![FieldError::new(
                "publishedYear",
                "must be a whole number",
            )])
        })
    }

    fn into_new_book(self) -> Result<NewBook, BookError> {
        let published_year = Self::parse_year(&self.published_year)?;
        Ok(NewBook {
            title: self.title,
            author: self.author,
            genre: self.genre,
            published_year,
        })
    }

    /// Blank inputs mean "leave unchanged".
    fn into_patch(self) -> Result<BookPatch, BookError> {
        let supplied = |value: String| (!value.trim().is_empty()).then_some(value);
        let published_year = if self.published_year.trim().is_empty() {
            None
        } else {
            Some(Self::parse_year(&self.published_year)?)
        };

        Ok(BookPatch {
            title: supplied(self.title),
            author: supplied(self.author),
            genre: supplied(self.genre),
            published_year,
        })
    }
}

async fn home() -> Html<String> {
    layout(
        "Library Catalog",
        r#"<div class="card">
      <h1>Welcome to the Library Catalog</h1>
      <p>A small service for managing a library of books.</p>
      <p><a href="/api/books">Browse the collection</a></p>
      <p><a href="/add-book">Add a book</a></p>
      <p><a href="/swagger-ui">API documentation</a></p>
    </div>"#,
    )
}

async fn add_form() -> Html<String> {
    form_page("Add a book", "/add-book", &BookForm::default())
}

async fn add_book(
    State(service): State<BookService>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Response {
    let result = match form.map_err(rejected_form).and_then(|Form(form)| form.into_new_book()) {
        Ok(input) => service.create(input).await.map(|_| ()),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => Redirect::to(LIST_PATH).into_response(),
        Err(err) => error_page(err),
    }
}

async fn edit_form(State(service): State<BookService>, Path(id): Path<String>) -> Response {
    match service.get(&id).await {
        Ok(book) => {
            let form = BookForm {
                title: book.title,
                author: book.author,
                genre: book.genre,
                published_year: book.published_year.to_string(),
            };
            let action = format!("/edit-book/{}", escape_html(&book.id));
            form_page("Edit book", &action, &form).into_response()
        }
        Err(err) => error_page(err),
    }
}

async fn edit_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    form: Result<Form<BookForm>, FormRejection>,
) -> Response {
    let result = match form.map_err(rejected_form).and_then(|Form(form)| form.into_patch()) {
        Ok(patch) => service.update(&id, patch).await.map(|_| ()),
        // An unknown id wins over a bad submission.
        Err(err) => service.get(&id).await.and(Err(err)),
    };

    match result {
        Ok(()) => Redirect::to(LIST_PATH).into_response(),
        Err(err) => error_page(err),
    }
}

async fn delete_book(State(service): State<BookService>, Path(id): Path<String>) -> Response {
    match service.delete(&id).await {
        Ok(()) => Redirect::to(LIST_PATH).into_response(),
        Err(err) => error_page(err),
    }
}

fn rejected_form(rejection: FormRejection) -> BookError {
    BookError::InvalidInput(vec![FieldError::new("form", rejection.body_text())])
}

/// Cards for every book, each with delete and edit actions.
pub fn book_list_page(books: &[Book]) -> Html<String> {
    let cards: String = books.iter().map(book_card).collect();
    let body = if books.is_empty() {
        r#"<p>No books yet. <a href="/add-book">Add the first one</a>.</p>"#.to_string()
    } else {
        cards
    };

    layout("All Books", &format!("<h1>All Books</h1>\n{body}"))
}

fn book_card(book: &Book) -> String {
    let id = escape_html(&book.id);
    format!(
        r#"
    <div class="card">
      <h2>{title}</h2>
      <p><strong>Author:</strong> {author}</p>
      <p><strong>Genre:</strong> {genre}</p>
      <p><strong>Published:</strong> {year}</p>
      <div class="actions">
        <form method="POST" action="/delete-book/{id}" onsubmit="return confirm('Delete this book?');">
          <button class="danger">Delete</button>
        </form>
        <form method="GET" action="/edit-book/{id}">
          <button class="primary">Edit</button>
        </form>
      </div>
    </div>"#,
        title = escape_html(&book.title),
        author = escape_html(&book.author),
        genre = escape_html(&book.genre),
        year = book.published_year,
    )
}

fn form_page(heading: &str, action: &str, form: &BookForm) -> Html<String> {
    let field = |label: &str, name: &str, value: &str, kind: &str| {
        format!(
            r#"<label>{label}<input type="{kind}" name="{name}" value="{value}"></label>"#,
            value = escape_html(value),
        )
    };

    let body = format!(
        r#"<div class="card">
      <h1>{heading}</h1>
      <form method="POST" action="{action}">
        {title}
        {author}
        {genre}
        {year}
        <p><button class="primary">Save</button></p>
      </form>
    </div>"#,
        heading = escape_html(heading),
        title = field("Title", "title", &form.title, "text"),
        author = field("Author", "author", &form.author, "text"),
        genre = field("Genre", "genre", &form.genre, "text"),
        year = field("Published year", "publishedYear", &form.published_year, "number"),
    );

    layout(heading, &body)
}

/// Render a service failure with the status the JSON API would use.
pub fn error_page(err: BookError) -> Response {
    let (status, items) = match &err {
        BookError::InvalidInput(errors) => (
            StatusCode::BAD_REQUEST,
            errors
                .iter()
                .map(|e| format!("<li>{}: {}</li>", escape_html(&e.field), escape_html(&e.error)))
                .collect::<String>(),
        ),
        BookError::NotFound(_) => (StatusCode::NOT_FOUND, "<li>Book not found</li>".to_string()),
        BookError::Storage(e) => {
            tracing::error!(error = %e, "storage failure while rendering page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "<li>Something went wrong while loading books.</li>".to_string(),
            )
        }
    };

    let body = format!(
        r#"<div class="card">
      <h1>{code}</h1>
      <ul class="errors">{items}</ul>
      <p><a href="{LIST_PATH}">Back to the collection</a></p>
    </div>"#,
        code = status.as_u16(),
    );

    (status, layout("Error", &body)).into_response()
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {body}
</body>
</html>"#,
        title = escape_html(title),
    ))
}
