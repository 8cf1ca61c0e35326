//! `"name"`/`"content"` pairs salvaged from malformed JSON, then bare filename markers

use crate::generation::extraction::{ExtractionStrategy, insert_file};
use crate::generation::{FileMap, GeneratedArtifact};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static STRICT_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""name"\s*:\s*"((?:[^"\\]|\\.)*)"\s*,\s*"content"\s*:\s*"((?:[^"\\]|\\.)*)"\s*[,}]"#)
        .expect("strict pair regex is valid")
});

static LOOSE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"name"\s*:\s*"([^"\n]+)"\s*,\s*"content"\s*:\s*"(.*?)"\s*(?:\}|,\s*"|\z)"#)
        .expect("loose pair regex is valid")
});

/// Names probed when no pairs are found at all
pub const CONVENTIONAL_FILENAMES: &[&str] = &[
    "main.py",
    "models.py",
    "api.py",
    "requirements.txt",
    ".env.example",
    "README.md",
];

/// Recovers files from text that looks like JSON but does not parse
pub struct DelimitedFiles;

impl ExtractionStrategy for DelimitedFiles {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn extract(&self, artifact: &GeneratedArtifact) -> FileMap {
        let raw = artifact.raw_response.as_str();
        if raw.trim().is_empty() || serde_json::from_str::<Value>(raw).is_ok() {
            return FileMap::new();
        }

        let files = salvage_pairs(raw);
        if files.is_empty() {
            conventional_sections(raw)
        } else {
            files
        }
    }
}

/// `"name"`/`"content"` pairs, strict quoting first, then the permissive scan
pub fn salvage_pairs(text: &str) -> FileMap {
    let files = pairs(&STRICT_PAIR, text);
    if files.is_empty() {
        pairs(&LOOSE_PAIR, text)
    } else {
        files
    }
}

fn pairs(pattern: &Regex, raw: &str) -> FileMap {
    let mut files = FileMap::new();
    for caps in pattern.captures_iter(raw) {
        let (Some(name), Some(content)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let name = unescape(name.as_str()).trim().to_string();
        let content = unescape(content.as_str());
        if name.is_empty() || content.is_empty() {
            continue;
        }
        insert_file(&mut files, name, content);
    }
    files
}

/// Undo the JSON string escapes a model is likely to emit
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Text after each conventional filename, up to the next one
fn conventional_sections(raw: &str) -> FileMap {
    let mut markers: Vec<(usize, &str)> = CONVENTIONAL_FILENAMES
        .iter()
        .flat_map(|name| occurrences(raw, name).map(move |at| (at, *name)))
        .collect();
    markers.sort_unstable();

    let mut files = FileMap::new();
    for name in CONVENTIONAL_FILENAMES {
        let Some(&(at, _)) = markers.iter().find(|(_, n)| n == name) else {
            continue;
        };
        let start = at + name.len();
        let end = markers
            .iter()
            .map(|(pos, _)| *pos)
            .find(|pos| *pos >= start)
            .unwrap_or(raw.len());

        let content = raw[start..end]
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '"' | ',' | '*' | '`'));
        if content.is_empty() {
            continue;
        }
        debug!(file = %name, chars = content.len(), "Recovered file from filename marker");
        files.insert(name.to_string(), unescape(content));
    }
    files
}

/// Positions of `name` that are not part of a longer identifier
fn occurrences<'a>(raw: &'a str, name: &'a str) -> impl Iterator<Item = usize> + 'a {
    raw.match_indices(name).filter_map(move |(at, _)| {
        let before = raw[..at].chars().next_back();
        let after = raw[at + name.len()..].chars().next();
        let part_of_word = |c: char| c.is_alphanumeric() || c == '_';
        let bounded = !before.is_some_and(|c| part_of_word(c) || c == '.')
            && !after.is_some_and(part_of_word);
        bounded.then_some(at)
    })
}
