//! In-memory [`BookRepository`] for service and handler tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::error::BookError;
use super::models::{Book, BookUpdate, NewBook};
use super::repository::BookRepository;

type FailureFactory = Box<dyn Fn() -> BookError + Send>;

#[derive(Default)]
struct State {
    rows: BTreeMap<i64, Book>,
    last_id: i64,
    calls: Vec<&'static str>,
    fail_next: Option<FailureFactory>,
}

/// Mirrors the PostgreSQL repository's contract, records every call, and
/// can be primed to fail the next one.
#[derive(Default)]
pub struct MemoryBookRepository {
    state: Mutex<State>,
}

impl MemoryBookRepository {
    /// Names of repository methods invoked so far.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Make the next repository call return the produced error.
    pub fn fail_next_with(&self, failure: impl Fn() -> BookError + Send + 'static) {
        self.state.lock().unwrap().fail_next = Some(Box::new(failure));
    }

    fn enter(&self, call: &'static str) -> Result<std::sync::MutexGuard<'_, State>, BookError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(failure) => Err(failure()),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn create(&self, book: &NewBook) -> Result<Book, BookError> {
        let mut state = self.enter("create")?;
        if state.rows.values().any(|row| row.title == book.title) {
            return Err(BookError::Conflict);
        }

        state.last_id += 1;
        let now = Utc::now();
        let row = Book {
            id: state.last_id,
            title: book.title.clone(),
            description: book.description.clone(),
            qty: book.qty,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<Book, BookError> {
        let state = self.enter("get_by_id")?;
        state.rows.get(&id).cloned().ok_or(BookError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<Book>, BookError> {
        let state = self.enter("get_all")?;
        if state.rows.is_empty() {
            return Err(BookError::EmptyResult);
        }
        Ok(state.rows.values().cloned().collect())
    }

    async fn update(&self, book: &BookUpdate) -> Result<(), BookError> {
        let mut state = self.enter("update")?;
        if state
            .rows
            .values()
            .any(|row| row.title == book.title && row.id != book.id)
        {
            return Err(BookError::Conflict);
        }

        let row = state.rows.get_mut(&book.id).ok_or(BookError::NotFound)?;
        row.title = book.title.clone();
        row.description = book.description.clone();
        row.qty = book.qty;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), BookError> {
        let mut state = self.enter("delete")?;
        state.rows.remove(&id).map(|_| ()).ok_or(BookError::NotFound)
    }

    async fn exists_by_title(&self, title: &str) -> Result<bool, BookError> {
        let state = self.enter("exists_by_title")?;
        Ok(state.rows.values().any(|row| row.title == title))
    }
}
