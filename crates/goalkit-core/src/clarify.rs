//! Ambiguity resolution: decide, per template section, whether a value comes
//! from the input, a default, or the user.
//!
//! Only material gaps (scope or experience impact) without a sensible default
//! become questions, ranked scope > experience and capped at
//! [`Resolver::HARD_CAP`]. Ranked-out gaps are settled with the recommended
//! option and never asked later.

use crate::error::{GoalkitError, Result};
use crate::template::{SectionSpec, Template};
use crate::types::Impact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    /// Taken from the user's input text.
    Input,
    /// Supplied by the workflow (e.g. the list of goals being coordinated).
    Context,
    /// Template default for a section the input did not mention.
    Default,
    /// Recommended option applied without asking.
    Defaulted,
    /// User picked one of the offered options.
    Answered,
    /// User wrote their own answer.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub text: String,
    pub origin: ValueOrigin,
}

impl ResolvedValue {
    pub fn new(text: impl Into<String>, origin: ValueOrigin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }
}

// ---------------------------------------------------------------------------
// Questions and answers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationOption {
    pub label: String,
    pub answer: String,
    pub implications: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    pub id: String,
    /// Template section key this question fills.
    pub section: String,
    pub topic: String,
    pub question: String,
    pub impact: Impact,
    pub options: Vec<ClarificationOption>,
}

const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

impl ClarificationQuestion {
    fn from_spec(id: usize, spec: &SectionSpec) -> Option<Self> {
        let clarify = spec.clarify.as_ref()?;
        Some(Self {
            id: format!("Q{id}"),
            section: spec.key.to_string(),
            topic: clarify.topic.to_string(),
            question: clarify.question.to_string(),
            impact: clarify.impact,
            options: clarify
                .options
                .iter()
                .zip(OPTION_LABELS)
                .map(|(o, label)| ClarificationOption {
                    label: label.to_string(),
                    answer: o.answer.to_string(),
                    implications: o.implications.to_string(),
                })
                .collect(),
        })
    }

    /// Markdown presentation: the question followed by an option table with
    /// a trailing row for a custom answer.
    pub fn render(&self) -> String {
        let mut out = format!(
            "### {}: {}\n\n**Context**: {} ({} impact)\n\n| Option | Answer | Implications |\n|--------|--------|--------------|\n",
            self.id, self.topic, self.question, self.impact
        );
        for o in &self.options {
            out.push_str(&format!("| {} | {} | {} |\n", o.label, o.answer, o.implications));
        }
        out.push_str("| Custom | Provide your own answer | Recorded as written |\n");
        out
    }

    pub fn resolve(&self, answer: &Answer) -> Result<ResolvedValue> {
        match answer {
            Answer::Option(label) => self
                .options
                .iter()
                .find(|o| o.label.eq_ignore_ascii_case(label))
                .map(|o| ResolvedValue::new(o.answer.clone(), ValueOrigin::Answered))
                .ok_or_else(|| GoalkitError::UnknownOption {
                    question: self.id.clone(),
                    option: label.clone(),
                }),
            Answer::Custom(text) => Ok(ResolvedValue::new(text.trim(), ValueOrigin::Custom)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Option(String),
    Custom(String),
}

impl FromStr for Answer {
    type Err = GoalkitError;

    /// A single letter A-D picks an option; anything else is a custom answer.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GoalkitError::NoInput);
        }
        if s.len() == 1 && OPTION_LABELS.iter().any(|l| l.eq_ignore_ascii_case(s)) {
            return Ok(Answer::Option(s.to_ascii_uppercase()));
        }
        Ok(Answer::Custom(s.to_string()))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Option(label) => f.write_str(label),
            Answer::Custom(text) => f.write_str(text),
        }
    }
}

/// Parse `Q1=A` or `Q2=my own answer`.
pub fn parse_answer_arg(arg: &str) -> Result<(String, Answer)> {
    let (id, value) = arg
        .split_once('=')
        .ok_or_else(|| GoalkitError::UnknownQuestion(arg.to_string()))?;
    let id = id.trim().to_ascii_uppercase();
    if !id.starts_with('Q') || id[1..].parse::<u32>().is_err() {
        return Err(GoalkitError::UnknownQuestion(id));
    }
    Ok((id, value.parse()?))
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub values: BTreeMap<String, ResolvedValue>,
    pub questions: Vec<ClarificationQuestion>,
    /// Optional sections dropped because nothing could fill them.
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    max_questions: usize,
}

impl Resolver {
    pub const HARD_CAP: usize = 3;

    pub fn new(max_questions: usize) -> Self {
        Self {
            max_questions: max_questions.min(Self::HARD_CAP),
        }
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    /// Resolve every section of `template` given the values already known.
    pub fn resolve(
        &self,
        template: &Template,
        known: &BTreeMap<String, ResolvedValue>,
    ) -> Draft {
        let mut draft = Draft {
            values: known.clone(),
            ..Default::default()
        };
        let mut candidates: Vec<(Impact, usize, &SectionSpec)> = Vec::new();

        for (index, spec) in template.sections.iter().enumerate() {
            if draft.values.contains_key(spec.key) {
                continue;
            }
            if let Some(default) = spec.default {
                draft
                    .values
                    .insert(spec.key.to_string(), ResolvedValue::new(default, ValueOrigin::Default));
                continue;
            }
            match &spec.clarify {
                Some(c) if c.impact.is_material() => candidates.push((c.impact, index, spec)),
                Some(c) if spec.required => {
                    draft.values.insert(
                        spec.key.to_string(),
                        ResolvedValue::new(c.recommended(), ValueOrigin::Defaulted),
                    );
                }
                _ if !spec.required => draft.removed.push(spec.key.to_string()),
                _ => {}
            }
        }

        candidates.sort_by_key(|(impact, index, _)| (*impact, *index));
        for (rank, (_, _, spec)) in candidates.into_iter().enumerate() {
            if rank < self.max_questions {
                if let Some(q) = ClarificationQuestion::from_spec(rank + 1, spec) {
                    draft.questions.push(q);
                }
            } else if let Some(c) = &spec.clarify {
                draft.values.insert(
                    spec.key.to_string(),
                    ResolvedValue::new(c.recommended(), ValueOrigin::Defaulted),
                );
            }
        }
        draft
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Self::HARD_CAP)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
