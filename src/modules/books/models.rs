use catalog_db::{Document, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

/// A catalogued book as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
}

/// Request model for creating a new book. Every field is required.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBook {
    #[validate(length(min = 1, max = 150, message = "must be 1-150 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub genre: String,
    pub published_year: i32,
}

/// Request model for a partial update. Absent (or null) fields are left as
/// they are; present ones follow the same rules as [`NewBook`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookPatch {
    #[validate(length(min = 1, max = 150, message = "must be 1-150 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

/// One rejected field, as reported in error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

impl NewBook {
    /// Trim text fields and check every constraint.
    pub fn validated(self, current_year: i32) -> Result<BookFields, Vec<FieldError>> {
        let book = Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.trim().to_string(),
            published_year: self.published_year,
        };

        let mut errors = field_errors(book.validate());
        errors.extend(check_year(book.published_year, current_year));
        if !errors.is_empty() {
            return Err(sorted(errors));
        }

        Ok(BookFields {
            title: book.title,
            author: book.author,
            genre: book.genre,
            published_year: book.published_year,
        })
    }
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.published_year.is_none()
    }

    /// Trim the supplied text fields and check only what was supplied.
    pub fn validated(self, current_year: i32) -> Result<Self, Vec<FieldError>> {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        let patch = Self {
            title: trim(self.title),
            author: trim(self.author),
            genre: trim(self.genre),
            published_year: self.published_year,
        };

        let mut errors = field_errors(patch.validate());
        if let Some(year) = patch.published_year {
            errors.extend(check_year(year, current_year));
        }
        if !errors.is_empty() {
            return Err(sorted(errors));
        }

        Ok(patch)
    }

    /// Only the supplied fields, keyed by their stored names.
    pub fn into_document(self) -> Document {
        let mut document = Document::new();
        if let Some(title) = self.title {
            document.insert("title".to_string(), Value::String(title));
        }
        if let Some(author) = self.author {
            document.insert("author".to_string(), Value::String(author));
        }
        if let Some(genre) = self.genre {
            document.insert("genre".to_string(), Value::String(genre));
        }
        if let Some(year) = self.published_year {
            document.insert("publishedYear".to_string(), Value::from(year));
        }
        document
    }
}

/// Validated field set of a book, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
}

impl BookFields {
    pub fn into_document(self) -> Document {
        let mut document = Document::new();
        document.insert("title".to_string(), Value::String(self.title));
        document.insert("author".to_string(), Value::String(self.author));
        document.insert("genre".to_string(), Value::String(self.genre));
        document.insert("publishedYear".to_string(), Value::from(self.published_year));
        document
    }
}

impl TryFrom<Record> for Book {
    type Error = serde_json::Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let fields: BookFields = serde_json::from_value(Value::Object(record.fields))?;
        Ok(Book {
            id: record.id,
            title: fields.title,
            author: fields.author,
            genre: fields.genre,
            published_year: fields.published_year,
        })
    }
}

fn check_year(year: i32, current_year: i32) -> Option<FieldError> {
    if year < 0 {
        Some(FieldError::new("publishedYear", "must not be negative"))
    } else if year > current_year {
        Some(FieldError::new(
            "publishedYear",
            format!("must not be later than {current_year}"),
        ))
    } else {
        None
    }
}

fn field_errors(result: Result<(), ValidationErrors>) -> Vec<FieldError> {
    let Err(errors) = result else {
        return Vec::new();
    };

    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let reason = failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                FieldError::new(field.to_string(), reason)
            })
        })
        .collect()
}

fn sorted(mut errors: Vec<FieldError>) -> Vec<FieldError> {
    errors.sort_by(|a, b| a.field.cmp(&b.field));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YEAR: i32 = 2026;

    fn new_book(title: &str, year: i32) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "George Orwell".to_string(),
            genre: "Dystopian".to_string(),
            published_year: year,
        }
    }

    #[test]
    fn valid_book_is_trimmed() {
        let fields = NewBook {
            title: "  1984 ".to_string(),
            author: "\tGeorge Orwell".to_string(),
            genre: "Dystopian\n".to_string(),
            published_year: 1949,
        }
        .validated(YEAR)
        .unwrap();

        assert_eq!(fields.title, "1984");
        assert_eq!(fields.author, "George Orwell");
        assert_eq!(fields.genre, "Dystopian");
    }

    #[test]
    fn blank_title_is_rejected() {
        for title in ["", "   "] {
            let errors = new_book(title, 1949).validated(YEAR).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "title");
        }
    }

    #[test]
    fn title_length_counts_characters() {
        assert!(new_book(&"é".repeat(150), 1949).validated(YEAR).is_ok());
        assert!(new_book(&"x".repeat(151), 1949).validated(YEAR).is_err());
    }

    #[test]
    fn year_bounds() {
        assert!(new_book("X", 0).validated(YEAR).is_ok());
        assert!(new_book("X", YEAR).validated(YEAR).is_ok());

        let future = new_book("X", YEAR + 1).validated(YEAR).unwrap_err();
        assert_eq!(future, vec![FieldError::new("publishedYear", "must not be later than 2026")]);

        let negative = new_book("X", -1).validated(YEAR).unwrap_err();
        assert_eq!(negative[0].field, "publishedYear");
    }

    #[test]
    fn every_failure_is_reported() {
        let errors = NewBook {
            title: String::new(),
            author: "a".repeat(101),
            genre: " ".to_string(),
            published_year: YEAR + 5,
        }
        .validated(YEAR)
        .unwrap_err();

        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["author", "genre", "publishedYear", "title"]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let payload = json!({
            "title": "1984", "author": "George Orwell", "genre": "Dystopian",
            "publishedYear": 1949, "isbn": "x"
        });
        assert!(serde_json::from_value::<NewBook>(payload).is_err());

        assert!(serde_json::from_value::<BookPatch>(json!({"rating": 5})).is_err());
    }

    #[test]
    fn year_must_be_an_integer() {
        let payload = json!({
            "title": "1984", "author": "George Orwell", "genre": "Dystopian",
            "publishedYear": "1949"
        });
        assert!(serde_json::from_value::<NewBook>(payload).is_err());
    }

    #[test]
    fn patch_checks_only_supplied_fields() {
        let patch: BookPatch = serde_json::from_value(json!({"title": " Animal Farm "})).unwrap();
        let patch = patch.validated(YEAR).unwrap();

        assert_eq!(patch.title.as_deref(), Some("Animal Farm"));
        assert_eq!(
            patch.into_document(),
            json!({"title": "Animal Farm"}).as_object().cloned().unwrap()
        );

        let bad: BookPatch = serde_json::from_value(json!({"genre": "", "publishedYear": YEAR + 1})).unwrap();
        let errors = bad.validated(YEAR).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn empty_patch() {
        let patch: BookPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());
        assert!(patch.into_document().is_empty());
    }

    #[test]
    fn book_serializes_with_public_id() {
        let book = Book {
            id: "abc".to_string(),
            title: "1984".to_string(),
            author: "George Orwell".to_string(),
            genre: "Dystopian".to_string(),
            published_year: 1949,
        };

        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({
                "id": "abc",
                "title": "1984",
                "author": "George Orwell",
                "genre": "Dystopian",
                "publishedYear": 1949
            })
        );
    }

    #[test]
    fn record_without_required_fields_is_rejected() {
        let record = Record {
            id: "abc".to_string(),
            fields: json!({"title": "1984"}).as_object().cloned().unwrap(),
        };
        assert!(Book::try_from(record).is_err());
    }
}
