//! Error types for the generation domain

use thiserror::Error;

/// Errors raised while building a generation request
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("At least one documentation URL is required")]
    NoDocumentationSources,

    #[error("Invalid documentation URL {url}: {reason}")]
    InvalidDocumentationUrl { url: String, reason: String },
}

/// Failure reported by a generation workflow.
///
/// Never crosses the pipeline boundary: the invoker turns it into `error_details`
/// on an otherwise successful response, using the `Display` text verbatim.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0}")]
    Execution(String),

    #[error("Planning step failed: {0}")]
    Planning(String),

    #[error("Code generation failed: {0}")]
    Coding(String),

    #[error("Prompt rendering failed: {0}")]
    Prompt(#[from] tera::Error),

    #[error("Workflow task aborted: {0}")]
    Aborted(String),
}
