//! Books catalogue: persistence, business rules and the HTTP surface.

pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;
use sqlx::PgPool;

use repository::{BookRepository, PgBookRepository};
use service::BookService;

/// Schema owned by the books module.
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        id: "001_create_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id          BIGSERIAL    PRIMARY KEY,
                title       VARCHAR(50)  NOT NULL,
                description VARCHAR(255) NOT NULL,
                qty         INTEGER      NOT NULL,
                created_at  TIMESTAMPTZ  NOT NULL DEFAULT now(),
                updated_at  TIMESTAMPTZ  NOT NULL DEFAULT now(),
                CONSTRAINT uq_books_title UNIQUE (title),
                CONSTRAINT ck_books_qty CHECK (qty BETWEEN 0 AND 100)
            );
            "#,
    }]
}

pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self {
            service: Arc::new(BookService::new(repository)),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    /// Book routes live at the server root (`/book`, `/books`).
    fn route_prefix(&self) -> String {
        String::new()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        // every outcome is wrapped in the shared envelope
        let reply = |description: &str| {
            json!({
                "description": description,
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Envelope"}}}
            })
        };
        let body = |schema: &str| {
            json!({
                "required": true,
                "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{schema}")}}}
            })
        };

        Some(json!({
            "paths": {
                "/book": {
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": body("CreateBook"),
                        "responses": {
                            "200": reply("Book has been created"),
                            "400": reply("Malformed body or validation error"),
                            "409": reply("Title already taken"),
                            "500": reply("Internal server error")
                        }
                    },
                    "put": {
                        "summary": "Replace a book's fields",
                        "tags": ["Books"],
                        "requestBody": body("UpdateBook"),
                        "responses": {
                            "200": reply("Book has been updated"),
                            "400": reply("Malformed body or validation error"),
                            "404": reply("Record not found"),
                            "409": reply("Title already taken"),
                            "500": reply("Internal server error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "requestBody": body("DeleteBook"),
                        "responses": {
                            "200": reply("Book has been deleted"),
                            "400": reply("Malformed body or validation error"),
                            "404": reply("Record not found"),
                            "500": reply("Internal server error")
                        }
                    }
                },
                "/book/{id}": {
                    "get": {
                        "summary": "Fetch a book by id",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": {"type": "integer", "format": "int64"}
                        }],
                        "responses": {
                            "200": reply("Book has been retrieved"),
                            "400": reply("Id is not an integer"),
                            "404": reply("Record not found"),
                            "500": reply("Internal server error")
                        }
                    }
                },
                "/books": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "available",
                            "in": "query",
                            "required": true,
                            "schema": {"type": "boolean"}
                        }],
                        "responses": {
                            "200": reply("Books have been retrieved"),
                            "400": reply("available is missing or not true"),
                            "404": reply("Table is empty"),
                            "500": reply("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookSummary": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "format": "int64"},
                            "title": {"type": "string"},
                            "description": {"type": "string"},
                            "qty": {"type": "integer"}
                        },
                        "required": ["id", "title", "description", "qty"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string", "minLength": 3, "maxLength": 50},
                            "description": {"type": "string", "minLength": 3, "maxLength": 255},
                            "qty": {"type": "integer", "minimum": 0, "maximum": 100}
                        },
                        "required": ["title", "description", "qty"]
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "format": "int64", "minimum": 1},
                            "title": {"type": "string", "minLength": 3, "maxLength": 50},
                            "description": {"type": "string", "minLength": 3, "maxLength": 255},
                            "qty": {"type": "integer", "minimum": 0, "maximum": 100}
                        },
                        "required": ["id", "title", "description", "qty"]
                    },
                    "DeleteBook": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "format": "int64", "minimum": 1}
                        },
                        "required": ["id"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        migrations()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module backed by PostgreSQL.
pub fn create_module(pool: PgPool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(PgBookRepository::new(pool))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::MemoryBookRepository;

    #[test]
    fn schema_enforces_title_uniqueness_and_qty_range() {
        let migrations = migrations();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0].up.contains(repository::TITLE_CONSTRAINT));
        assert!(migrations[0].up.contains("CHECK (qty BETWEEN 0 AND 100)"));
    }

    #[test]
    fn openapi_documents_every_route() {
        let module = BooksModule::new(Arc::new(MemoryBookRepository::default()));
        let spec = module.openapi().unwrap();

        for path in ["/book", "/book/{id}", "/books"] {
            assert!(spec["paths"].get(path).is_some(), "{path} missing");
        }
        assert!(spec["paths"]["/book"].get("put").is_some());
        assert_eq!(module.route_prefix(), "");
    }
}
