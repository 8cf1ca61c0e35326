//! Generation domain - turns aggregated documentation into template files
//!
//! The workflow itself sits behind [`GenerationWorkflow`]. This module owns what
//! happens around it: normalising its outcome, mining the response for files and
//! materialising them on disk.

pub mod credentials;
pub mod errors;
pub mod extraction;
pub mod invoker;
pub mod persister;
pub mod traits;
pub mod types;

pub use credentials::*;
pub use errors::*;
pub use extraction::{ExtractedFiles, ExtractionStrategy, ResponseExtractor};
pub use invoker::*;
pub use persister::*;
pub use traits::*;
pub use types::*;
