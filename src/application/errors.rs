//! Application layer error types

use thiserror::Error;

/// Application layer errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Invalid generation request: {0}")]
    GenerationError(#[from] crate::generation::GenerationError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Record store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),
}

/// Validation errors for requests
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Server name cannot be empty")]
    EmptyServerName,

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors raised by a [`RecordStore`](crate::application::RecordStore)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Task execution failed: {0}")]
    Spawn(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
