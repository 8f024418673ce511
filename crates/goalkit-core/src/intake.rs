//! Turn a free-text seed into per-section values for a template.
//!
//! Input may mix prose with `Label: value` lines. Labeled lines that name a
//! section (by key, heading or alias) fill that section verbatim; everything
//! else is free text. The primary section receives the free text, and cue
//! patterns pull further sections out of it.

use crate::clarify::{ResolvedValue, ValueOrigin};
use crate::error::{GoalkitError, Result};
use crate::template::Template;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, OnceLock};

static LABEL_RE: OnceLock<Regex> = OnceLock::new();
static TYPED_MARKER_RE: OnceLock<Regex> = OnceLock::new();
static CUE_RES: OnceLock<Mutex<HashMap<&'static str, Regex>>> = OnceLock::new();

fn label_re() -> &'static Regex {
    LABEL_RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z][A-Za-z _&/\-]{0,40}?)\s*:\s*(.+?)\s*$").unwrap()
    })
}

/// Clarification markers typed into the input, closed or not.
fn typed_marker_re() -> &'static Regex {
    TYPED_MARKER_RE
        .get_or_init(|| Regex::new(r"(?i)\[\s*needs\s+clarification\b[^\]\n]*\]?").unwrap())
}

/// Compiled cue patterns, keyed by their source.
fn cue_re(pattern: &'static str) -> Option<Regex> {
    let cache = CUE_RES.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(re) = cache.get(pattern) {
        return Some(re.clone());
    }
    match Regex::new(pattern) {
        Ok(re) => {
            cache.insert(pattern, re.clone());
            Some(re)
        }
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid intake cue");
            None
        }
    }
}

/// Drop marker spans so only the resolver decides what stays open.
fn strip_markers(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            let stripped = typed_marker_re().replace_all(line, "");
            if stripped.len() == line.len() {
                line.to_string()
            } else {
                stripped.split_whitespace().collect::<Vec<_>>().join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intake {
    raw: String,
    /// Values supplied by the workflow rather than typed by the user.
    context: BTreeMap<String, String>,
}

impl Intake {
    /// Fails with [`GoalkitError::NoInput`] when `raw` is blank once any
    /// typed clarification markers are removed.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = strip_markers(raw);
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GoalkitError::NoInput);
        }
        Ok(Self {
            raw: raw.to_string(),
            context: BTreeMap::new(),
        })
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// First sentence of the input, capped at 80 characters.
    pub fn headline(&self) -> String {
        let first = self
            .raw
            .split(['.', '\n', '!', '?'])
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(&self.raw);
        let mut headline: String = first.chars().take(80).collect();
        if first.chars().count() > 80 {
            headline = headline.trim_end().to_string();
        }
        capitalize(&headline)
    }

    /// Values for every section the input (or context) speaks to.
    pub fn extract(&self, template: &Template) -> BTreeMap<String, ResolvedValue> {
        let mut values = BTreeMap::new();
        let mut free_lines: Vec<&str> = Vec::new();

        for line in self.raw.lines() {
            let labeled = label_re().captures(line).and_then(|caps| {
                template
                    .sections
                    .iter()
                    .find(|s| s.answers_to(&caps[1]))
                    .map(|s| (s.key, caps[2].to_string()))
            });
            match labeled {
                Some((key, value)) => {
                    values.insert(key.to_string(), ResolvedValue::new(value, ValueOrigin::Input));
                }
                None => free_lines.push(line),
            }
        }

        let free_text = free_lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if let Some(primary) = template.primary() {
            if !values.contains_key(primary.key) {
                let text = if free_text.is_empty() {
                    self.raw.split_whitespace().collect::<Vec<_>>().join(" ")
                } else {
                    free_text.clone()
                };
                values.insert(
                    primary.key.to_string(),
                    ResolvedValue::new(text, ValueOrigin::Input),
                );
            }
        }

        for spec in template.sections.iter().filter(|s| !s.primary) {
            if values.contains_key(spec.key) {
                continue;
            }
            if let Some(found) = spec.cues.iter().find_map(|cue| match_cue(cue, &free_text)) {
                values.insert(
                    spec.key.to_string(),
                    ResolvedValue::new(found, ValueOrigin::Input),
                );
            }
        }

        for (key, value) in &self.context {
            if template.section(key).is_some() {
                values.insert(
                    key.clone(),
                    ResolvedValue::new(value.clone(), ValueOrigin::Context),
                );
            }
        }

        values
    }
}

fn match_cue(pattern: &'static str, text: &str) -> Option<String> {
    let re = cue_re(pattern)?;
    let caps = re.captures(text)?;
    let found = caps.get(1).or_else(|| caps.get(0))?.as_str();
    let found = found
        .trim()
        .trim_end_matches([',', '.', ';', ':'])
        .trim();
    if found.is_empty() {
        None
    } else {
        Some(capitalize(found))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{GOAL, VISION, COORDINATION};

    fn text(values: &BTreeMap<String, ResolvedValue>, key: &str) -> Option<String> {
        values.get(key).map(|v| v.text.clone())
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(matches!(Intake::parse("   \n"), Err(GoalkitError::NoInput)));
    }

    #[test]
    fn primary_receives_free_text() {
        let values = Intake::parse("task app for teams").unwrap().extract(&VISION);
        assert_eq!(
            text(&values, "vision_statement").as_deref(),
            Some("task app for teams")
        );
        assert_eq!(text(&values, "target_users").as_deref(), Some("Teams"));
        assert!(!values.contains_key("success_metrics"));
        assert!(!values.contains_key("platform"));
    }

    #[test]
    fn labeled_lines_fill_sections() {
        let input = "Help teams plan their week\nMetrics: 50% fewer missed deadlines\nTimeline: 6 weeks";
        let values = Intake::parse(input).unwrap().extract(&GOAL);
        assert_eq!(
            text(&values, "goal_statement").as_deref(),
            Some("Help teams plan their week")
        );
        assert_eq!(
            text(&values, "success_criteria").as_deref(),
            Some("50% fewer missed deadlines")
        );
        assert_eq!(text(&values, "timeline").as_deref(), Some("6 weeks"));
    }

    #[test]
    fn unknown_labels_stay_in_free_text() {
        let values = Intake::parse("Note: keep it small").unwrap().extract(&VISION);
        assert_eq!(
            text(&values, "vision_statement").as_deref(),
            Some("Note: keep it small")
        );
    }

    #[test]
    fn cues_extract_measurable_outcomes() {
        let input = "Reduce onboarding time by 50% for new users within 2 months";
        let values = Intake::parse(input).unwrap().extract(&GOAL);
        assert!(text(&values, "success_criteria").unwrap().contains("50%"));
        assert_eq!(text(&values, "timeline").as_deref(), Some("2 months"));
    }

    #[test]
    fn context_values_are_marked() {
        let values = Intake::parse("Align the two launches")
            .unwrap()
            .with_context("goals", "001-a; 002-b")
            .extract(&COORDINATION);
        let goals = values.get("goals").unwrap();
        assert_eq!(goals.origin, ValueOrigin::Context);
        assert_eq!(goals.text, "001-a; 002-b");
    }

    #[test]
    fn typed_markers_are_dropped() {
        let input = "Task app [NEEDS CLARIFICATION: who?] for teams\n[needs clarification: platform]\nBuilt for the web [NEEDS CLARIFICATION: which browsers";
        let intake = Intake::parse(input).unwrap();
        assert!(!intake.raw().to_lowercase().contains("needs clarification"));
        let values = intake.extract(&VISION);
        assert_eq!(
            text(&values, "vision_statement").as_deref(),
            Some("Task app for teams Built for the web")
        );
        assert!(matches!(
            Intake::parse("[NEEDS CLARIFICATION: everything]"),
            Err(GoalkitError::NoInput)
        ));
    }

    #[test]
    fn cue_patterns_are_compiled_once() {
        let first = cue_re(crate::template::CUE_PERCENT).unwrap();
        let again = cue_re(crate::template::CUE_PERCENT).unwrap();
        assert_eq!(first.as_str(), again.as_str());
        assert!(CUE_RES
            .get()
            .unwrap()
            .lock()
            .unwrap()
            .contains_key(crate::template::CUE_PERCENT));
    }

    #[test]
    fn headline_is_first_sentence() {
        let intake = Intake::parse("ship the beta. then grow").unwrap();
        assert_eq!(intake.headline(), "Ship the beta");
    }
}
