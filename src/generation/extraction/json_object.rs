//! `{"files": ...}` objects, either the whole response or a lone ```json block

use crate::generation::extraction::{ExtractionStrategy, collect_entries};
use crate::generation::{FileEntry, FileMap, GeneratedArtifact};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^[ \t]*```(?:json|JSON)[ \t]*\r?\n(.*?)^[ \t]*```[ \t]*\r?$")
        .expect("json fence regex is valid")
});

const NAME_KEYS: &[&str] = &["name", "filename", "path"];

/// Parses the response as a JSON object with a `files` member
pub struct JsonObjectFiles;

impl ExtractionStrategy for JsonObjectFiles {
    fn name(&self) -> &'static str {
        "json_object"
    }

    fn extract(&self, artifact: &GeneratedArtifact) -> FileMap {
        let raw = artifact.raw_response.trim();
        if raw.is_empty() {
            return FileMap::new();
        }

        let entries = parse_files_object(raw).or_else(|| {
            JSON_FENCE
                .captures(raw)
                .and_then(|caps| caps.get(1))
                .and_then(|body| parse_files_object(body.as_str()))
        });

        entries.map(|e| collect_entries(&e)).unwrap_or_default()
    }
}

/// Parse `text` as a JSON object and pull out its `files` member
pub fn parse_files_object(text: &str) -> Option<Vec<FileEntry>> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    files_from_value(&value)
}

/// Accepts `files` as a list of `{name, content}` objects or as a name-to-content map
pub fn files_from_value(value: &Value) -> Option<Vec<FileEntry>> {
    match value.as_object()?.get("files")? {
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    Value::Object(obj) => Some(entry_from_object(obj)),
                    other => {
                        warn!(index, kind = %kind_of(other), "Skipping non-object file entry");
                        None
                    }
                })
                .collect(),
        ),
        Value::Object(map) => Some(
            map.iter()
                .map(|(name, content)| FileEntry::new(name.clone(), text_of(content)))
                .collect(),
        ),
        other => {
            warn!(kind = %kind_of(other), "Ignoring 'files' member that is neither list nor object");
            None
        }
    }
}

fn entry_from_object(obj: &Map<String, Value>) -> FileEntry {
    let name = NAME_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .unwrap_or_default();
    let content = obj.get("content").map(text_of).unwrap_or_default();
    FileEntry::new(name, content)
}

/// Strings pass through, anything else is serialized
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(raw: &str) -> FileMap {
        JsonObjectFiles.extract(&GeneratedArtifact::from_raw(raw))
    }

    #[test]
    fn test_files_list() {
        let files = run(r#"{"files":[{"name":"main.py","content":"x"},{"filename":"api.py","content":"y"}]}"#);
        assert_eq!(files.len(), 2);
        assert_eq!(files["main.py"], "x");
        assert_eq!(files["api.py"], "y");
    }

    #[test]
    fn test_files_map() {
        let files = run(r##"{"files":{"main.py":"print(1)","README.md":"# Svc"}}"##);
        assert_eq!(files["main.py"], "print(1)");
        assert_eq!(files["README.md"], "# Svc");
    }

    #[test]
    fn test_non_string_content_is_serialized() {
        let files = run(r#"{"files":[{"name":"settings.json","content":{"debug":true}}]}"#);
        let parsed: Value = serde_json::from_str(&files["settings.json"]).unwrap();
        assert_eq!(parsed["debug"], Value::Bool(true));
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let files = run(r#"{"files":["main.py", 3, {"name":"ok.py","content":"1"}]}"#);
        assert_eq!(files.keys().collect::<Vec<_>>(), ["ok.py"]);
    }

    #[test]
    fn test_json_inside_fence() {
        let raw = "Result:\n```json\n{\"files\":[{\"name\":\"main.py\",\"content\":\"x\"}]}\n```\n";
        assert_eq!(run(raw)["main.py"], "x");
    }

    #[test]
    fn test_misses() {
        assert!(run("").is_empty());
        assert!(run("not json").is_empty());
        assert!(run(r#"{"other":1}"#).is_empty());
        assert!(run(r#"{"files":"main.py"}"#).is_empty());
        assert!(run(r#"[{"name":"main.py","content":"x"}]"#).is_empty());
    }
}
