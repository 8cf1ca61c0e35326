//! Heading-based section extraction for markdown documentation

/// Title given to text that precedes the first heading
pub const INTRODUCTION_SECTION: &str = "Introduction";

/// One section of a markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationSection {
    pub title: String,
    pub body: String,
}

/// Return the heading title if `line` opens a level-1 or level-2 section.
fn heading_title(line: &str) -> Option<&str> {
    line.strip_prefix("# ")
        .or_else(|| line.strip_prefix("## "))
        .map(str::trim)
}

/// Split markdown into sections on `# ` and `## ` headings.
///
/// Deeper headings are ordinary content. Bodies are the lines between two headings
/// joined with `\n`, verbatim. A heading with no lines before the next heading (or the
/// end of the text) produces no section, and a document that opens with a heading
/// has no introduction.
pub fn extract_sections(markdown: &str) -> Vec<DocumentationSection> {
    let mut sections = Vec::new();
    let mut current_title = INTRODUCTION_SECTION.to_string();
    let mut current_lines: Vec<&str> = Vec::new();

    for line in markdown.split('\n') {
        match heading_title(line) {
            Some(title) => {
                if !current_lines.is_empty() {
                    sections.push(DocumentationSection {
                        title: current_title,
                        body: current_lines.join("\n"),
                    });
                }
                current_title = title.to_string();
                current_lines = Vec::new();
            }
            None => current_lines.push(line),
        }
    }

    if !current_lines.is_empty() {
        sections.push(DocumentationSection {
            title: current_title,
            body: current_lines.join("\n"),
        });
    }

    sections
}
