//! HTTP surface of the books module.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use bookshelf_http::{AppError, Envelope, JsonBody, PathParam, QueryParams};

use super::models::{
    BookSummary, CreateBookRequest, DeleteBookRequest, ListBooksQuery, UpdateBookRequest,
};
use super::service::BookService;

type ApiResult<T> = Result<Envelope<T>, AppError>;

/// Routes for the books resource, bound to `service`.
pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route(
            "/book",
            post(create_book).put(update_book).delete(delete_book),
        )
        .route("/book/{id}", get(get_book))
        .route("/books", get(list_books))
        .with_state(service)
}

async fn create_book(
    State(service): State<Arc<BookService>>,
    JsonBody(request): JsonBody<CreateBookRequest>,
) -> ApiResult<BookSummary> {
    let book = service.create_book(request).await?;
    Ok(Envelope::success(
        "Book has been created",
        BookSummary::from(book),
    ))
}

async fn get_book(
    State(service): State<Arc<BookService>>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<BookSummary> {
    let summary = service.get_book_by_id(id).await?;
    Ok(Envelope::success("Book has been retrieved", summary))
}

async fn list_books(
    State(service): State<Arc<BookService>>,
    QueryParams(query): QueryParams<ListBooksQuery>,
) -> ApiResult<Vec<BookSummary>> {
    let available = query
        .available
        .as_deref()
        .and_then(|value| value.parse::<bool>().ok())
        .ok_or_else(|| AppError::invalid_param("available must be true or false"))?;
    let books = service.list_books(available).await?;
    Ok(Envelope::success("Books have been retrieved", books))
}

async fn update_book(
    State(service): State<Arc<BookService>>,
    JsonBody(request): JsonBody<UpdateBookRequest>,
) -> ApiResult<()> {
    service.update_book(request).await?;
    Ok(Envelope::message("Book has been updated"))
}

async fn delete_book(
    State(service): State<Arc<BookService>>,
    JsonBody(request): JsonBody<DeleteBookRequest>,
) -> ApiResult<()> {
    service.delete_book(request).await?;
    Ok(Envelope::message("Book has been deleted"))
}
