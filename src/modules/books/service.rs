use std::sync::Arc;

use super::error::BookError;
use super::models::{
    Book, BookSummary, BookUpdate, CreateBookRequest, DeleteBookRequest, NewBook,
    UpdateBookRequest,
};
use super::repository::BookRepository;

/// Business rules for books: validation, title uniqueness, and the mapping
/// of persistence outcomes to domain results.
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Validate, reject duplicate titles, then insert.
    pub async fn create_book(&self, request: CreateBookRequest) -> Result<Book, BookError> {
        let book = NewBook::try_from(request)?;
        tracing::debug!(title = %book.title, "creating book");

        if self.repository.exists_by_title(&book.title).await? {
            tracing::info!(title = %book.title, "rejected duplicate book title");
            return Err(BookError::Conflict);
        }

        let created = self.repository.create(&book).await?;
        tracing::info!(book_id = created.id, "book created");
        Ok(created)
    }

    pub async fn get_book_by_id(&self, id: i64) -> Result<BookSummary, BookError> {
        tracing::debug!(book_id = id, "fetching book");
        let book = self.repository.get_by_id(id).await?;
        Ok(BookSummary::from(book))
    }

    /// `available` acts as a gate, not a filter: anything but `true` is
    /// rejected before storage is consulted.
    pub async fn list_books(&self, available: bool) -> Result<Vec<BookSummary>, BookError> {
        tracing::debug!(available, "listing books");
        if !available {
            return Err(BookError::InvalidParam("available must be true"));
        }

        let books = self.repository.get_all().await?;
        tracing::debug!(count = books.len(), "books listed");
        Ok(books.into_iter().map(BookSummary::from).collect())
    }

    pub async fn update_book(&self, request: UpdateBookRequest) -> Result<(), BookError> {
        let update = BookUpdate::try_from(request)?;
        tracing::debug!(book_id = update.id, "updating book");
        self.repository.update(&update).await?;
        tracing::info!(book_id = update.id, "book updated");
        Ok(())
    }

    pub async fn delete_book(&self, request: DeleteBookRequest) -> Result<(), BookError> {
        let id = request.validated_id()?;
        tracing::debug!(book_id = id, "deleting book");
        self.repository.delete(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}
