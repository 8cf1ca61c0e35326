//! Last resort: the whole response when it reads like a Python module

use crate::generation::extraction::{ExtractionStrategy, MAIN_MODULE_FILE};
use crate::generation::{FileMap, GeneratedArtifact};
use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:import\s+\w|from\s+\S+\s+import\s)").expect("import regex is valid")
});

static DEF_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:async\s+)?def\s+\w+\s*\(").expect("def regex is valid")
});

/// True when the text has both an import and a function definition
pub fn looks_like_module(text: &str) -> bool {
    IMPORT_LINE.is_match(text) && DEF_LINE.is_match(text)
}

/// Stores the whole response as the entry-point module
pub struct RawModuleFallback;

impl ExtractionStrategy for RawModuleFallback {
    fn name(&self) -> &'static str {
        "raw_module"
    }

    fn extract(&self, artifact: &GeneratedArtifact) -> FileMap {
        let mut files = FileMap::new();
        if looks_like_module(&artifact.raw_response) {
            files.insert(MAIN_MODULE_FILE.to_string(), artifact.raw_response.clone());
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_detected() {
        assert!(looks_like_module("import os\n\ndef main():\n    pass\n"));
        assert!(looks_like_module("from x import y\nasync def go(a):\n    ...\n"));
    }

    #[test]
    fn test_prose_rejected() {
        assert!(!looks_like_module("I could not generate the server."));
        assert!(!looks_like_module("import os\nprint(os.name)\n"));
        assert!(!looks_like_module("def lonely():\n    return 1\n"));
    }

    #[test]
    fn test_whole_response_becomes_main() {
        let raw = "import os\n\ndef main():\n    print(os.getcwd())\n";
        let files = RawModuleFallback.extract(&GeneratedArtifact::from_raw(raw));
        assert_eq!(files[MAIN_MODULE_FILE], raw);
    }
}
