//! Aggregated documentation handed to the generation workflow

use std::collections::HashMap;

/// Separator placed between two sources in the concatenated text
const SOURCE_SEPARATOR: &str = "\n\n";

/// Identifies one section of one documentation source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub source: String,
    pub title: String,
}

impl SectionKey {
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
        }
    }
}

/// Documentation of every successfully fetched source, built once per run
#[derive(Debug, Clone, Default)]
pub struct AggregatedDocumentation {
    raw_text: String,
    sections: HashMap<SectionKey, String>,
    sources: Vec<String>,
}

impl AggregatedDocumentation {
    /// Append one fetched source. Call in input order.
    pub fn push_source(&mut self, source: &str, markdown: &str) {
        if !self.raw_text.is_empty() {
            self.raw_text.push_str(SOURCE_SEPARATOR);
        }
        self.raw_text.push_str(&format!("Source: {source}\n\n"));
        self.raw_text.push_str(markdown);

        for section in crate::documentation::extract_sections(markdown) {
            self.sections
                .insert(SectionKey::new(source, section.title), section.body);
        }
        self.sources.push(source.to_string());
    }

    /// Concatenated text of all sources, each prefixed with its origin URL
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// At most `limit` characters of the concatenated text, cut on a char boundary
    pub fn truncated(&self, limit: usize) -> &str {
        match self.raw_text.char_indices().nth(limit) {
            Some((idx, _)) => &self.raw_text[..idx],
            None => &self.raw_text,
        }
    }

    pub fn sections(&self) -> &HashMap<SectionKey, String> {
        &self.sections
    }

    pub fn section(&self, source: &str, title: &str) -> Option<&str> {
        self.sections
            .get(&SectionKey::new(source, title))
            .map(String::as_str)
    }

    /// Sources that contributed, in input order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_source_prefixes_and_orders() {
        let mut docs = AggregatedDocumentation::default();
        docs.push_source("https://a.dev/docs", "# A\nalpha");
        docs.push_source("https://b.dev/docs", "# B\nbeta");

        let text = docs.raw_text();
        let a = text.find("Source: https://a.dev/docs").unwrap();
        let b = text.find("Source: https://b.dev/docs").unwrap();
        assert!(a < b);
        assert!(text.contains("# A\nalpha"));
        assert_eq!(docs.sources(), ["https://a.dev/docs", "https://b.dev/docs"]);
        assert_eq!(docs.section("https://b.dev/docs", "B"), Some("beta"));
    }

    #[test]
    fn test_length_covers_every_source() {
        let sources = [("https://a.dev", "one\ntwo"), ("https://b.dev", "## Three\n3")];
        let mut docs = AggregatedDocumentation::default();
        for (url, text) in sources {
            docs.push_source(url, text);
        }
        let total: usize = sources.iter().map(|(_, text)| text.len()).sum();
        assert!(docs.raw_text().len() >= total);
    }

    #[test]
    fn test_truncated_respects_char_boundaries() {
        let mut docs = AggregatedDocumentation::default();
        docs.push_source("u", "héllo wörld");
        let full = docs.raw_text().chars().count();

        assert_eq!(docs.truncated(full + 10), docs.raw_text());
        let cut = docs.truncated(full - 3);
        assert_eq!(cut.chars().count(), full - 3);
        assert_eq!(docs.truncated(0), "");
    }

    #[test]
    fn test_empty_documentation() {
        let docs = AggregatedDocumentation::default();
        assert!(docs.is_empty());
        assert_eq!(docs.raw_text(), "");
        assert!(docs.sections().is_empty());
    }
}
