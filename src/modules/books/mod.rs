pub mod models;
pub mod routes;
pub mod service;
pub mod views;

use async_trait::async_trait;
use axum::Router;
use catalog_db::SharedStore;
use catalog_kernel::{InitCtx, Module};
use serde_json::json;

pub use service::{BookError, BookService};

/// Books module: JSON API under `/api/books` plus the HTML pages.
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self {
            service: BookService::new(store),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ctx.store.backend(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn pages(&self) -> Router {
        views::pages(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Book identifier",
            "schema": { "type": "string" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Get all books",
                        "description": "Returns JSON unless the Accept header prefers text/html.",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of all books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    },
                                    "text/html": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            },
                            "500": error("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Add a new book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": book("Book created successfully"),
                            "400": error("Invalid input"),
                            "500": error("Internal server error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": book("The book"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update some or all fields of a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": book("Updated book"),
                            "400": error("Invalid input"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": {
                                "description": "Book deleted",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/DeleteConfirmation" }
                                    }
                                }
                            },
                            "404": error("Book not found")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": { "schema": { "type": "string" } }
                                }
                            },
                            "500": error("Document store unreachable")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "The auto-generated ID of the book" },
                            "title": { "type": "string", "minLength": 1, "maxLength": 150 },
                            "author": { "type": "string", "minLength": 1, "maxLength": 100 },
                            "genre": { "type": "string", "minLength": 1, "maxLength": 100 },
                            "publishedYear": { "type": "integer", "minimum": 0 }
                        },
                        "required": ["id", "title", "author", "genre", "publishedYear"],
                        "example": {
                            "id": "0190b8a2-7c4e-7d2a-9f3b-5f1a2c3d4e5f",
                            "title": "Sapiens",
                            "author": "Yuval Noah Harari",
                            "genre": "History",
                            "publishedYear": 2011
                        }
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1, "maxLength": 150 },
                            "author": { "type": "string", "minLength": 1, "maxLength": 100 },
                            "genre": { "type": "string", "minLength": 1, "maxLength": 100 },
                            "publishedYear": {
                                "type": "integer",
                                "minimum": 0,
                                "description": "Not later than the current year"
                            }
                        },
                        "required": ["title", "author", "genre", "publishedYear"],
                        "additionalProperties": false
                    },
                    "BookPatch": {
                        "type": "object",
                        "description": "Any subset of the book fields; omitted fields are unchanged",
                        "properties": {
                            "title": { "type": "string", "minLength": 1, "maxLength": 150 },
                            "author": { "type": "string", "minLength": 1, "maxLength": 100 },
                            "genre": { "type": "string", "minLength": 1, "maxLength": 100 },
                            "publishedYear": { "type": "integer", "minimum": 0 }
                        },
                        "additionalProperties": false
                    },
                    "DeleteConfirmation": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" }
                        },
                        "required": ["message"]
                    }
                }
            }
        }))
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

/// Create a new instance of the books module
pub fn create_module(store: SharedStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
