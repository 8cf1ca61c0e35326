//! Pass-through of a file list the workflow already structured

use crate::generation::GeneratedArtifact;
use crate::generation::FileMap;
use crate::generation::extraction::{ExtractionStrategy, collect_entries};

/// Uses the artifact's structured file list as-is
pub struct StructuredFiles;

impl ExtractionStrategy for StructuredFiles {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn extract(&self, artifact: &GeneratedArtifact) -> FileMap {
        match &artifact.files {
            Some(entries) => collect_entries(entries),
            None => FileMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::FileEntry;

    #[test]
    fn test_keeps_valid_and_skips_malformed_entries() {
        let artifact = GeneratedArtifact::default().with_files(vec![
            FileEntry::new("main.py", "print('hi')"),
            FileEntry::new("", "nameless"),
            FileEntry::new("empty.py", ""),
            FileEntry::new("pkg/util.py", "X = 1"),
        ]);

        let files = StructuredFiles.extract(&artifact);
        assert_eq!(files.keys().collect::<Vec<_>>(), ["main.py", "pkg/util.py"]);
    }

    #[test]
    fn test_no_list_is_a_miss() {
        let artifact = GeneratedArtifact::from_raw("anything");
        assert!(StructuredFiles.extract(&artifact).is_empty());
    }
}
