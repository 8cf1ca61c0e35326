//! Fenced code blocks, named from their info string or caption line, or sniffed

use crate::generation::extraction::{
    ExtractionStrategy, MAIN_MODULE_FILE, insert_file, salvage_pairs,
};
use crate::generation::{FileMap, GeneratedArtifact};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^[ \t]*```[ \t]*([^\n`]*)\r?\n(.*?)^[ \t]*```[ \t]*\r?$")
        .expect("fence regex is valid")
});

static FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.\-/]*[\w\-]\.[A-Za-z0-9]+$").expect("filename regex is valid")
});

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+[.)]|[-+])\s+").expect("list marker regex is valid"));

static CLIENT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"class\s+\w*Client\b").expect("client class regex is valid"));

static SETTINGS_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+(?:Settings|Config)\b").expect("settings class regex is valid")
});

static PINNED_REQUIREMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[A-Za-z0-9_.\-\[\]]+\s*(?:==|>=|<=|~=)\s*\d").expect("pin regex is valid")
});

static CREDENTIAL_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[A-Z][A-Z0-9_]*(?:API_KEY|TOKEN|SECRET)[A-Z0-9_]*\s*=")
        .expect("credential regex is valid")
});

static MARKDOWN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+\S").expect("heading regex is valid"));

const ENTRY_POINT_MARKERS: &[&str] = &[
    "if __name__ == \"__main__\"",
    "if __name__ == '__main__'",
    "@mcp.tool",
    "FastMCP(",
];

const SCHEMA_MARKERS: &[&str] = &["BaseModel", "Field("];

const ASYNC_CLIENT_MARKERS: &[&str] = &["AsyncClient", "ClientSession("];

const CAPTION_PREFIXES: &[&str] = &["filename:", "file:", "path:"];

/// Names each fenced block and keeps the non-empty ones
pub struct FencedBlockFiles;

impl ExtractionStrategy for FencedBlockFiles {
    fn name(&self) -> &'static str {
        "fenced_blocks"
    }

    fn extract(&self, artifact: &GeneratedArtifact) -> FileMap {
        let raw = artifact.raw_response.as_str();
        let mut files = FileMap::new();

        for (index, caps) in FENCE.captures_iter(raw).enumerate() {
            let (Some(whole), Some(info), Some(body)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let content = body.as_str();
            if content.trim().is_empty() {
                continue;
            }

            let (language, declared) = parse_info_string(info.as_str());
            if declared.is_none() && language.as_deref() == Some("json") {
                let salvaged = salvage_pairs(content);
                if !salvaged.is_empty() {
                    debug!(block = index + 1, files = salvaged.len(), "Salvaged file pairs from json block");
                    for (name, content) in salvaged {
                        insert_file(&mut files, name, content);
                    }
                    continue;
                }
                if content.contains("\"files\"") {
                    debug!(block = index + 1, "Skipping unparseable files payload");
                    continue;
                }
            }

            let name = declared
                .or_else(|| caption_before(raw, whole.start()))
                .unwrap_or_else(|| infer_filename(content, raw, index + 1, language.as_deref()));

            debug!(block = index + 1, file = %name, "Named fenced block");
            insert_file(&mut files, name, content.to_string());
        }

        files
    }
}

/// Split an info string into a language and an optional declared filename
///
/// Handles `python`, `python main.py`, `python:main.py`, `main.py` and
/// `python title="main.py"`.
fn parse_info_string(info: &str) -> (Option<String>, Option<String>) {
    let mut language = None;
    let mut filename = None;

    for (position, token) in info.split_whitespace().enumerate() {
        let value = token
            .split_once('=')
            .map_or(token, |(_, v)| v)
            .trim_matches(|c| c == '"' || c == '\'');

        let (lang_part, name_part) = match value.split_once(':') {
            Some((l, n)) if position == 0 && !l.is_empty() => (Some(l), n),
            _ => (None, value),
        };

        if filename.is_none() && FILENAME.is_match(name_part) {
            filename = Some(name_part.to_string());
            if let Some(l) = lang_part {
                language.get_or_insert_with(|| l.to_lowercase());
            }
        } else if position == 0 {
            language = Some(value.to_lowercase());
        }
    }

    (language, filename)
}

/// Look for a filename caption on the nearest non-blank line above a block
fn caption_before(raw: &str, block_start: usize) -> Option<String> {
    let line = raw[..block_start].trim_end().rsplit('\n').next()?;
    filename_from_caption(line)
}

fn filename_from_caption(line: &str) -> Option<String> {
    let mut text = line.trim().trim_start_matches('#').trim();
    text = LIST_MARKER.find(text).map_or(text, |m| &text[m.end()..]);
    text = strip_decoration(text);

    let lowered = text.to_lowercase();
    if let Some(prefix) = CAPTION_PREFIXES.iter().find(|p| lowered.starts_with(**p)) {
        text = strip_decoration(&text[prefix.len()..]);
    }

    FILENAME.is_match(text).then(|| text.to_string())
}

fn strip_decoration(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '`' | '"' | '\'' | ':'))
}

/// Pick a conventional filename from what a block contains
pub fn infer_filename(content: &str, raw: &str, index: usize, language: Option<&str>) -> String {
    let has_any = |markers: &[&str]| markers.iter().any(|m| content.contains(m));

    if has_any(ENTRY_POINT_MARKERS) {
        return MAIN_MODULE_FILE.to_string();
    }
    if has_any(SCHEMA_MARKERS) {
        return "models.py".to_string();
    }
    if has_any(ASYNC_CLIENT_MARKERS) || CLIENT_CLASS.is_match(content) {
        return "api.py".to_string();
    }
    if content.contains("BaseSettings") || SETTINGS_CLASS.is_match(content) {
        return "config.py".to_string();
    }
    if PINNED_REQUIREMENT.is_match(content) && raw.to_lowercase().contains("requirements") {
        return "requirements.txt".to_string();
    }
    if CREDENTIAL_ASSIGNMENT.is_match(content) {
        return ".env.example".to_string();
    }
    if MARKDOWN_HEADING.is_match(content) && content.contains("Usage") {
        return "README.md".to_string();
    }

    format!("file_{index}.{}", extension_for(language))
}

fn extension_for(language: Option<&str>) -> &'static str {
    match language.unwrap_or_default() {
        "" | "python" | "py" | "python3" => "py",
        "markdown" | "md" => "md",
        "bash" | "sh" | "shell" | "zsh" => "sh",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yml",
        "javascript" | "js" => "js",
        "typescript" | "ts" => "ts",
        "dotenv" | "env" => "env",
        "dockerfile" | "docker" => "dockerfile",
        "ini" | "cfg" => "ini",
        _ => "txt",
    }
}
