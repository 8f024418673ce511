use crate::document::Document;
use crate::rubric::items_for;
use crate::template::Template;
use crate::types::{ArtifactKind, LoopState};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CheckContext
// ---------------------------------------------------------------------------

pub struct CheckContext<'a> {
    pub template: &'a Template,
    /// Root-relative path of the artifact this one must cite, if any.
    pub predecessor: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// ChecklistItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ContentQuality,
    Completeness,
    Readiness,
}

impl Category {
    pub fn heading(self) -> &'static str {
        match self {
            Category::ContentQuality => "Content Quality",
            Category::Completeness => "Completeness",
            Category::Readiness => "Readiness",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub evidence: String,
}

impl CheckOutcome {
    pub fn pass(evidence: impl Into<String>) -> Self {
        Self {
            passed: true,
            evidence: evidence.into(),
        }
    }

    pub fn fail(evidence: impl Into<String>) -> Self {
        Self {
            passed: false,
            evidence: evidence.into(),
        }
    }
}

/// A fn-pointer check with an optional automatic fix.
pub struct ChecklistItem {
    pub id: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub check: fn(&Document, &CheckContext) -> CheckOutcome,
    /// Returns true if it changed the document.
    pub fix: Option<fn(&mut Document, &CheckContext) -> bool>,
}

// ---------------------------------------------------------------------------
// ValidationReport (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub id: String,
    pub category: Category,
    pub description: String,
    pub passed: bool,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub kind: ArtifactKind,
    pub results: Vec<ItemResult>,
}

impl ValidationReport {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> Vec<&ItemResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Checklist file content for this report.
    pub fn render(&self, artifact: &str, state: LoopState, attempts: u32) -> String {
        let title = self.kind.as_str();
        let mut out = format!(
            "# {}{} Quality Checklist\n\n**Artifact**: {artifact}\n**State**: {state}\n**Correction attempts**: {attempts}\n**Passed**: {}/{}\n",
            title[..1].to_uppercase(),
            &title[1..],
            self.passed_count(),
            self.results.len()
        );
        for category in [
            Category::ContentQuality,
            Category::Completeness,
            Category::Readiness,
        ] {
            let items: Vec<_> = self
                .results
                .iter()
                .filter(|r| r.category == category)
                .collect();
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n## {category}\n\n"));
            for r in items {
                let mark = if r.passed { "x" } else { " " };
                out.push_str(&format!(
                    "- [{mark}] {} {}\n  - Evidence: {}\n",
                    r.id, r.description, r.evidence
                ));
            }
        }
        if state == LoopState::ReadyWithWarnings {
            out.push_str("\n## Unresolved\n\n");
            out.push_str(&format!(
                "> WARNING: automatic correction stopped after {attempts} attempts; these items need manual review.\n\n"
            ));
            for r in self.failures() {
                out.push_str(&format!("- {} {}: {}\n", r.id, r.description, r.evidence));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Checklist
// ---------------------------------------------------------------------------

pub struct Checklist {
    kind: ArtifactKind,
    items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn new(kind: ArtifactKind, items: Vec<ChecklistItem>) -> Self {
        Self { kind, items }
    }

    pub fn for_kind(kind: ArtifactKind) -> Self {
        Self::new(kind, items_for(kind))
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn evaluate(&self, doc: &Document, ctx: &CheckContext) -> ValidationReport {
        let results = self
            .items
            .iter()
            .map(|item| {
                let outcome = (item.check)(doc, ctx);
                ItemResult {
                    id: item.id.to_string(),
                    category: item.category,
                    description: item.description.to_string(),
                    passed: outcome.passed,
                    evidence: outcome.evidence,
                }
            })
            .collect();
        ValidationReport {
            kind: self.kind,
            results,
        }
    }

    /// Apply the fix of every failed item that has one.
    /// Returns the ids of items whose fix changed the document.
    pub fn correct(
        &self,
        doc: &mut Document,
        ctx: &CheckContext,
        report: &ValidationReport,
    ) -> Vec<String> {
        let mut applied = Vec::new();
        for failed in report.failures() {
            let Some(item) = self.items.iter().find(|i| i.id == failed.id) else {
                continue;
            };
            if let Some(fix) = item.fix {
                if fix(doc, ctx) {
                    applied.push(item.id.to_string());
                }
            }
        }
        applied
    }
}
