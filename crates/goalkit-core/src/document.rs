//! Markdown artifact model: a title, a `**Key**: value` metadata block and an
//! ordered list of `## Heading` sections.
//!
//! `render(parse(render(doc)))` is byte-identical to `render(doc)`, which is
//! what lets re-validation of a finished artifact be a no-op.

use regex::Regex;
use std::sync::OnceLock;

/// Token that must never survive in a finalized artifact.
pub const PLACEHOLDER_TOKEN: &str = "N/A";

const MARKER_OPEN: &str = "[NEEDS CLARIFICATION: ";

static MARKER_RE: OnceLock<Regex> = OnceLock::new();
static METADATA_RE: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn marker_re() -> &'static Regex {
    MARKER_RE.get_or_init(|| Regex::new(r"\[NEEDS CLARIFICATION: ([^\]]+)\]").unwrap())
}

fn metadata_re() -> &'static Regex {
    METADATA_RE.get_or_init(|| Regex::new(r"^\*\*([^*]+)\*\*:\s*(.*)$").unwrap())
}

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\bN/A\b|\bTBD\b|\{\{[^}]*\}\}").unwrap())
}

/// Render a clarification marker for `question`.
pub fn marker(question: &str) -> String {
    format!("{MARKER_OPEN}{question}]")
}

/// Questions of every clarification marker in `text`, in order of appearance.
pub fn find_markers(text: &str) -> Vec<String> {
    marker_re()
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// Placeholder tokens (`N/A`, `TBD`, `{{slot}}`) found in `text`.
pub fn find_placeholders(text: &str) -> Vec<String> {
    placeholder_re()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Section / Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub metadata: Vec<(String, String)>,
    pub intro: String,
    pub sections: Vec<Section>,
}

fn same_heading(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn parse(markdown: &str) -> Self {
        let mut doc = Document::default();
        let mut preamble: Vec<&str> = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in markdown.lines() {
            if let Some(heading) = line.strip_prefix("## ") {
                if let Some((h, body)) = current.take() {
                    doc.sections.push(Section::new(h, trim_blank_lines(&body)));
                }
                current = Some((heading.trim().to_string(), Vec::new()));
                continue;
            }
            match current.as_mut() {
                Some((_, body)) => body.push(line),
                None => {
                    if let Some(title) = line.strip_prefix("# ") {
                        if doc.title.is_empty() {
                            doc.title = title.trim().to_string();
                            continue;
                        }
                    }
                    if let Some(caps) = metadata_re().captures(line.trim()) {
                        doc.metadata
                            .push((caps[1].trim().to_string(), caps[2].trim().to_string()));
                    } else {
                        preamble.push(line);
                    }
                }
            }
        }
        if let Some((h, body)) = current.take() {
            doc.sections.push(Section::new(h, trim_blank_lines(&body)));
        }
        doc.intro = trim_blank_lines(&preamble);
        doc
    }

    pub fn render(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        if !self.metadata.is_empty() {
            out.push('\n');
            for (k, v) in &self.metadata {
                out.push_str(&format!("**{k}**: {v}\n"));
            }
        }
        if !self.intro.is_empty() {
            out.push('\n');
            out.push_str(&self.intro);
            out.push('\n');
        }
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n", section.heading));
            if !section.body.is_empty() {
                out.push('\n');
                out.push_str(&section.body);
                out.push('\n');
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| same_heading(&s.heading, heading))
    }

    pub fn section_mut(&mut self, heading: &str) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| same_heading(&s.heading, heading))
    }

    pub fn position(&self, heading: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| same_heading(&s.heading, heading))
    }

    pub fn headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.heading.as_str()).collect()
    }

    /// Remove a section. Returns `false` if it was not present.
    pub fn remove_section(&mut self, heading: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| !same_heading(&s.heading, heading));
        self.sections.len() < before
    }

    pub fn insert_section(&mut self, index: usize, section: Section) {
        let at = index.min(self.sections.len());
        self.sections.insert(at, section);
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .metadata
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.1 = value,
            None => self.metadata.push((key.to_string(), value)),
        }
    }

    pub fn markers(&self) -> Vec<String> {
        find_markers(&self.render())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Project Vision\n\n**Created**: 2026-10-18\n**Based on**: none\n\n## Vision Statement\n\nA task app for teams.\n\n## Success Metrics\n\n[NEEDS CLARIFICATION: What defines success?]\n";

    #[test]
    fn parse_reads_title_metadata_sections() {
        let doc = Document::parse(SAMPLE);
        assert_eq!(doc.title, "Project Vision");
        assert_eq!(doc.metadata_value("created"), Some("2026-10-18"));
        assert_eq!(
            doc.headings(),
            vec!["Vision Statement", "Success Metrics"]
        );
        assert_eq!(
            doc.section("vision statement").unwrap().body,
            "A task app for teams."
        );
    }

    #[test]
    fn render_parse_is_stable() {
        let doc = Document::parse(SAMPLE);
        let rendered = doc.render();
        assert_eq!(rendered, SAMPLE);
        assert_eq!(Document::parse(&rendered), doc);
    }

    #[test]
    fn markers_are_found() {
        let doc = Document::parse(SAMPLE);
        assert_eq!(doc.markers(), vec!["What defines success?"]);
        assert_eq!(
            find_markers(&marker("Who are the users?")),
            vec!["Who are the users?"]
        );
    }

    #[test]
    fn placeholders_detected_as_whole_tokens() {
        assert_eq!(find_placeholders("Budget: N/A"), vec!["N/A"]);
        assert_eq!(find_placeholders("owner {{name}} TBD"), vec!["{{name}}", "TBD"]);
        assert!(find_placeholders("NATO and TBDx are words").is_empty());
    }

    #[test]
    fn section_edits() {
        let mut doc = Document::parse(SAMPLE);
        assert!(doc.remove_section("Success Metrics"));
        assert!(!doc.remove_section("Success Metrics"));
        doc.insert_section(0, Section::new("Problem", "Too many tools."));
        assert_eq!(doc.position("Vision Statement"), Some(1));
        doc.set_metadata("Based on", "goal.md");
        assert_eq!(doc.metadata_value("based on"), Some("goal.md"));
        assert_eq!(doc.metadata.len(), 2);
    }
}
