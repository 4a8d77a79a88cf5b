use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A persisted book row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Book {
    /// Identity assigned by the database, never reused
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Copies in stock, 0 to 100
    pub qty: i32,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every update
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for inserting a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub qty: i32,
}

/// Validated full replacement of a book's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookUpdate {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub qty: i32,
}

/// Read-facing projection of a book, timestamps omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub qty: i32,
}

impl From<Book> for BookSummary {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
            qty: book.qty,
        }
    }
}

/// Body of `POST /book`.
///
/// Fields are optional so that a missing field surfaces as a "required"
/// validation message instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(required, length(min = 3, max = 50))]
    pub title: Option<String>,
    #[validate(required, length(min = 3, max = 255))]
    pub description: Option<String>,
    #[validate(required, range(min = 0, max = 100))]
    pub qty: Option<i32>,
}

/// Body of `PUT /book`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(required, range(min = 1))]
    pub id: Option<i64>,
    #[validate(required, length(min = 3, max = 50))]
    pub title: Option<String>,
    #[validate(required, length(min = 3, max = 255))]
    pub description: Option<String>,
    #[validate(required, range(min = 0, max = 100))]
    pub qty: Option<i32>,
}

/// Body of `DELETE /book`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DeleteBookRequest {
    #[validate(required, range(min = 1))]
    pub id: Option<i64>,
}

/// Query string of `GET /books`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksQuery {
    pub available: Option<String>,
}
