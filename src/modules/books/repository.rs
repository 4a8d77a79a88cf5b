use async_trait::async_trait;
use sqlx::PgPool;

use super::error::BookError;
use super::models::{Book, BookUpdate, NewBook};

/// Column list for books queries.
const COLUMNS: &str = "id, title, description, qty, created_at, updated_at";

/// Unique constraint backing title uniqueness.
pub const TITLE_CONSTRAINT: &str = "uq_books_title";

/// PostgreSQL SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Persistence capability the service depends on.
///
/// Every call is a single statement, attempted once. `update` and `delete`
/// report a missing row as [`BookError::NotFound`].
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book, returning the stored row with its assigned identity.
    async fn create(&self, book: &NewBook) -> Result<Book, BookError>;

    async fn get_by_id(&self, id: i64) -> Result<Book, BookError>;

    /// All books ordered by id; [`BookError::EmptyResult`] when there are none.
    async fn get_all(&self) -> Result<Vec<Book>, BookError>;

    /// Replace title, description and qty, refreshing `updated_at`.
    async fn update(&self, book: &BookUpdate) -> Result<(), BookError>;

    async fn delete(&self, id: i64) -> Result<(), BookError>;

    async fn exists_by_title(&self, title: &str) -> Result<bool, BookError>;
}

/// [`BookRepository`] backed by the `books` table.
#[derive(Clone)]
pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn create(&self, book: &NewBook) -> Result<Book, BookError> {
        let query = format!(
            "INSERT INTO books (title, description, qty)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Book>(&query)
            .bind(&book.title)
            .bind(&book.description)
            .bind(book.qty)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;

        if created.id < 1 {
            return Err(BookError::Internal(format!(
                "insert reported success without assigning an id (got {})",
                created.id
            )));
        }

        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Book, BookError> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
            .ok_or(BookError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<Book>, BookError> {
        let query = format!("SELECT {COLUMNS} FROM books ORDER BY id");
        let books = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        if books.is_empty() {
            return Err(BookError::EmptyResult);
        }
        Ok(books)
    }

    async fn update(&self, book: &BookUpdate) -> Result<(), BookError> {
        let result = sqlx::query(
            "UPDATE books
             SET title = $1, description = $2, qty = $3, updated_at = now()
             WHERE id = $4",
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.qty)
        .bind(book.id)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(BookError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), BookError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(BookError::NotFound);
        }
        Ok(())
    }

    async fn exists_by_title(&self, title: &str) -> Result<bool, BookError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE title = $1)")
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }
}

/// Map driver errors onto the domain: a missing row is `NotFound`, a title
/// unique violation is `Conflict`, everything else is a persistence failure.
fn classify(err: sqlx::Error) -> BookError {
    let title_taken = matches!(
        &err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(TITLE_CONSTRAINT)
    );

    if title_taken {
        BookError::Conflict
    } else if matches!(err, sqlx::Error::RowNotFound) {
        BookError::NotFound
    } else {
        tracing::error!(error = %err, "books query failed");
        BookError::Persistence(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::migrations;
    use assert_matches::assert_matches;
    use bookshelf_db::Database;

    #[test]
    fn row_not_found_is_not_found() {
        assert_matches!(classify(sqlx::Error::RowNotFound), BookError::NotFound);
    }

    #[test]
    fn other_driver_errors_are_persistence_failures() {
        assert_matches!(
            classify(sqlx::Error::PoolTimedOut),
            BookError::Persistence(sqlx::Error::PoolTimedOut)
        );
    }

    async fn repository(pool: PgPool) -> PgBookRepository {
        let owned: Vec<_> = migrations()
            .into_iter()
            .map(|migration| ("books".to_string(), migration))
            .collect();
        Database::from_pool(pool.clone())
            .run_migrations(&owned)
            .await
            .unwrap();
        PgBookRepository::new(pool)
    }

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            description: "Test Description".to_string(),
            qty: 10,
        }
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn create_then_fetch_round_trips(pool: PgPool) {
        let repo = repository(pool).await;

        let created = repo.create(&new_book("Test Title")).await.unwrap();
        assert!(created.id >= 1);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert!(repo.exists_by_title("Test Title").await.unwrap());
        assert!(!repo.exists_by_title("Other Title").await.unwrap());
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn duplicate_title_violates_constraint(pool: PgPool) {
        let repo = repository(pool).await;

        repo.create(&new_book("Test Title")).await.unwrap();
        assert_matches!(
            repo.create(&new_book("Test Title")).await,
            Err(BookError::Conflict)
        );
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn update_onto_taken_title_conflicts(pool: PgPool) {
        let repo = repository(pool).await;
        repo.create(&new_book("First Title")).await.unwrap();
        let second = repo.create(&new_book("Second Title")).await.unwrap();

        assert_matches!(
            repo.update(&BookUpdate {
                id: second.id,
                title: "First Title".to_string(),
                description: "Test Description".to_string(),
                qty: 10,
            })
            .await,
            Err(BookError::Conflict)
        );
        assert_eq!(repo.get_by_id(second.id).await.unwrap().title, "Second Title");
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn empty_table_and_missing_rows(pool: PgPool) {
        let repo = repository(pool).await;

        assert_matches!(repo.get_all().await, Err(BookError::EmptyResult));
        assert_matches!(repo.get_by_id(999).await, Err(BookError::NotFound));
        assert_matches!(repo.delete(999).await, Err(BookError::NotFound));
        assert_matches!(
            repo.update(&BookUpdate {
                id: 99,
                title: "Updated Title".to_string(),
                description: "Updated Description".to_string(),
                qty: 15,
            })
            .await,
            Err(BookError::NotFound)
        );
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn update_and_delete_existing_row(pool: PgPool) {
        let repo = repository(pool).await;
        let created = repo.create(&new_book("Test Title")).await.unwrap();

        repo.update(&BookUpdate {
            id: created.id,
            title: "Updated Title".to_string(),
            description: "Updated Description".to_string(),
            qty: 15,
        })
        .await
        .unwrap();

        let updated = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(updated.title, "Updated Title");
        assert_eq!(updated.qty, 15);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        repo.delete(created.id).await.unwrap();
        assert_matches!(repo.get_all().await, Err(BookError::EmptyResult));

        // identities are not reused
        let next = repo.create(&new_book("Test Title")).await.unwrap();
        assert!(next.id > created.id);
    }
}
