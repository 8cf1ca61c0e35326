//! Port interfaces for the generation domain

use crate::generation::{WorkflowError, WorkflowOutcome, WorkflowState};
use async_trait::async_trait;
use std::path::Path;

/// The LLM-driven workflow that turns documentation into code.
///
/// Opaque to the pipeline: it receives the initial state and returns whatever subset
/// of the outcome fields it managed to fill. No timeout is applied by the caller.
#[async_trait]
pub trait GenerationWorkflow: Send + Sync {
    async fn run(&self, state: WorkflowState) -> Result<WorkflowOutcome, WorkflowError>;
}

/// Writes template files to their destination
#[async_trait]
pub trait OutputService: Send + Sync {
    /// Ensure a directory (and its parents) exists
    async fn ensure_directory(&self, path: &Path) -> std::io::Result<()>;

    /// Write one file, creating parent directories and replacing existing content
    async fn write_file(&self, path: &Path, content: &str) -> std::io::Result<()>;

    /// Relative paths of every regular file below `root`
    async fn list_files(&self, root: &Path) -> std::io::Result<Vec<String>>;
}
