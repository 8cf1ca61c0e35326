//! Response extraction - mines an unreliable model response for source files
//!
//! Strategies run strict-to-loose and the first one that yields at least one file
//! wins:
//!
//! 1. [`StructuredFiles`] - the file list the workflow already produced
//! 2. [`JsonObjectFiles`] - the response parsed as `{"files": ...}`
//! 3. [`FencedBlockFiles`] - fenced code blocks, named or sniffed
//! 4. [`DelimitedFiles`] - `"name"`/`"content"` pairs in broken JSON
//! 5. [`RawModuleFallback`] - the whole response, if it reads like a module
//!
//! Every strategy is total. An empty result is a miss, not an error.

pub mod delimited;
pub mod fenced;
pub mod json_object;
pub mod raw;
pub mod structured;

pub use delimited::*;
pub use fenced::*;
pub use json_object::*;
pub use raw::*;
pub use structured::*;

use crate::generation::{FileEntry, FileMap, GeneratedArtifact};
use tracing::{debug, info, warn};

/// Name used for the entry-point module
pub const MAIN_MODULE_FILE: &str = "main.py";

/// One way of turning a model response into files
pub trait ExtractionStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Extract files; an empty map means "no match"
    fn extract(&self, artifact: &GeneratedArtifact) -> FileMap;
}

/// Files found in a response together with the strategy that found them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFiles {
    pub files: FileMap,
    pub strategy: Option<&'static str>,
}

impl ExtractedFiles {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Ordered cascade of extraction strategies
pub struct ResponseExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ResponseExtractor {
    /// The standard strict-to-loose cascade
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(StructuredFiles),
            Box::new(JsonObjectFiles),
            Box::new(FencedBlockFiles),
            Box::new(DelimitedFiles),
            Box::new(RawModuleFallback),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run the cascade, stopping at the first non-empty result
    pub fn extract(&self, artifact: &GeneratedArtifact) -> ExtractedFiles {
        for strategy in &self.strategies {
            let files = strategy.extract(artifact);
            if files.is_empty() {
                debug!(strategy = strategy.name(), "Extraction strategy found no files");
                continue;
            }
            info!(
                strategy = strategy.name(),
                files = files.len(),
                "Extracted files from model response"
            );
            return ExtractedFiles {
                files,
                strategy: Some(strategy.name()),
            };
        }

        warn!(
            raw_chars = artifact.raw_response.len(),
            "No files could be extracted from model response"
        );
        ExtractedFiles::default()
    }
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert a file, last write wins
pub(crate) fn insert_file(files: &mut FileMap, name: String, content: String) {
    if files.insert(name.clone(), content).is_some() {
        warn!(file = %name, "Duplicate file name in model response, keeping the last one");
    }
}

/// Keep entries with a non-empty name and content, logging the rest
pub(crate) fn collect_entries(entries: &[FileEntry]) -> FileMap {
    let mut files = FileMap::new();
    for (index, entry) in entries.iter().enumerate() {
        let name = entry.name.trim();
        if name.is_empty() || entry.content.is_empty() {
            warn!(
                index,
                name = %entry.name,
                "Skipping file entry with empty name or content"
            );
            continue;
        }
        insert_file(&mut files, name.to_string(), entry.content.clone());
    }
    files
}
