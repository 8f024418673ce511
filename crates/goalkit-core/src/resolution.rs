//! The clarification-and-correction loop.
//!
//! ```text
//! Drafting -> Validating -> Ready
//!                 |  \
//!                 |   +--> Correcting -> Validating ... -> ReadyWithWarnings
//!                 v
//!        ClarificationPending -> Drafting
//! ```
//!
//! The loop suspends in `ClarificationPending` whenever the answer source has
//! nothing to offer; the caller persists the session and resumes it later.

use crate::checklist::{CheckContext, Checklist, ValidationReport};
use crate::clarify::{Answer, ClarificationQuestion, ResolvedValue, Resolver};
use crate::document::Document;
use crate::error::{GoalkitError, Result};
use crate::template::Template;
use crate::types::{ArtifactKind, LoopState};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Answer sources
// ---------------------------------------------------------------------------

/// Supplies answers to open clarification questions. Returning `None`
/// suspends the loop with the questions still pending.
pub trait AnswerSource {
    fn answer(&mut self, questions: &[ClarificationQuestion]) -> Option<Vec<(String, Answer)>>;
}

/// Never answers: the loop stops at the first clarification round.
pub struct NoAnswers;

impl AnswerSource for NoAnswers {
    fn answer(&mut self, _questions: &[ClarificationQuestion]) -> Option<Vec<(String, Answer)>> {
        None
    }
}

/// Answers given up front, keyed by question id; used once. Answers that
/// leave an open question uncovered fail with
/// [`GoalkitError::UnansweredQuestions`] instead of suspending again.
#[derive(Debug, Clone, Default)]
pub struct PresetAnswers {
    answers: BTreeMap<String, Answer>,
}

impl PresetAnswers {
    pub fn new(answers: impl IntoIterator<Item = (String, Answer)>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl AnswerSource for PresetAnswers {
    fn answer(&mut self, questions: &[ClarificationQuestion]) -> Option<Vec<(String, Answer)>> {
        if self.answers.is_empty() || questions.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.answers).into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct LoopLimits {
    pub max_questions: usize,
    pub max_correction_attempts: u32,
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self {
            max_questions: Resolver::HARD_CAP,
            max_correction_attempts: 3,
        }
    }
}

pub struct ResolutionLoop {
    template: &'static Template,
    checklist: Checklist,
    resolver: Resolver,
    limits: LoopLimits,
    title: String,
    metadata: Vec<(String, String)>,
    predecessor: Option<String>,

    state: LoopState,
    values: BTreeMap<String, ResolvedValue>,
    questions: Vec<ClarificationQuestion>,
    document: Document,
    report: Option<ValidationReport>,
    attempts: u32,
    trail: Vec<LoopState>,
}

impl ResolutionLoop {
    fn base(kind: ArtifactKind, limits: LoopLimits, state: LoopState) -> Self {
        Self {
            template: Template::for_kind(kind),
            checklist: Checklist::for_kind(kind),
            resolver: Resolver::new(limits.max_questions),
            limits,
            title: String::new(),
            metadata: Vec::new(),
            predecessor: None,
            state,
            values: BTreeMap::new(),
            questions: Vec::new(),
            document: Document::default(),
            report: None,
            attempts: 0,
            trail: vec![state],
        }
    }

    /// Start a fresh draft from values extracted out of the user's input.
    pub fn draft(
        kind: ArtifactKind,
        limits: LoopLimits,
        title: impl Into<String>,
        metadata: Vec<(String, String)>,
        values: BTreeMap<String, ResolvedValue>,
    ) -> Self {
        let mut this = Self::base(kind, limits, LoopState::Drafting);
        this.title = title.into();
        this.metadata = metadata;
        this.values = values;
        this
    }

    /// Resume a session suspended with open questions.
    pub fn resume(
        kind: ArtifactKind,
        limits: LoopLimits,
        title: impl Into<String>,
        metadata: Vec<(String, String)>,
        values: BTreeMap<String, ResolvedValue>,
        questions: Vec<ClarificationQuestion>,
    ) -> Self {
        let mut this = Self::base(kind, limits, LoopState::ClarificationPending);
        this.title = title.into();
        this.metadata = metadata;
        this.values = values;
        this.questions = questions;
        this.document = this
            .template
            .build(&this.title, &this.metadata, &this.values, &this.questions);
        this
    }

    /// Re-validate an existing document as-is.
    pub fn revalidate(kind: ArtifactKind, limits: LoopLimits, document: Document) -> Self {
        let mut this = Self::base(kind, limits, LoopState::Validating);
        this.document = document;
        this
    }

    /// Carry the values a re-validated document was built from.
    pub fn with_values(mut self, values: BTreeMap<String, ResolvedValue>) -> Self {
        self.values = values;
        self
    }

    pub fn with_predecessor(mut self, predecessor: Option<String>) -> Self {
        self.predecessor = predecessor;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn questions(&self) -> &[ClarificationQuestion] {
        &self.questions
    }

    pub fn values(&self) -> &BTreeMap<String, ResolvedValue> {
        &self.values
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn trail(&self) -> &[LoopState] {
        &self.trail
    }

    /// Ids of checklist items still failing once the loop gave up.
    pub fn unresolved(&self) -> Vec<String> {
        match (&self.report, self.state) {
            (Some(r), LoopState::ReadyWithWarnings) => {
                r.failures().iter().map(|f| f.id.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    fn transition(&mut self, to: LoopState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(GoalkitError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        tracing::debug!(
            kind = %self.template.kind,
            from = %self.state,
            to = %to,
            "loop transition"
        );
        self.state = to;
        self.trail.push(to);
        Ok(())
    }

    fn fill(&mut self) {
        let draft = self.resolver.resolve(self.template, &self.values);
        self.values = draft.values;
        self.questions = draft.questions;
        self.document = self
            .template
            .build(&self.title, &self.metadata, &self.values, &self.questions);
    }

    fn apply_answers(&mut self, answers: Vec<(String, Answer)>) -> Result<()> {
        let mut resolved = BTreeMap::new();
        for (id, answer) in answers {
            let question = self
                .questions
                .iter()
                .find(|q| q.id.eq_ignore_ascii_case(&id))
                .ok_or_else(|| GoalkitError::UnknownQuestion(id.clone()))?;
            resolved.insert(question.section.clone(), question.resolve(&answer)?);
        }
        let unanswered: Vec<&str> = self
            .questions
            .iter()
            .filter(|q| !resolved.contains_key(&q.section))
            .map(|q| q.id.as_str())
            .collect();
        if !unanswered.is_empty() {
            return Err(GoalkitError::UnansweredQuestions(unanswered.join(", ")));
        }
        self.values.extend(resolved);
        self.questions.clear();
        Ok(())
    }

    fn check_context(&self) -> CheckContext<'_> {
        CheckContext {
            template: self.template,
            predecessor: self.predecessor.as_deref(),
        }
    }

    /// Drive the loop until it reaches a terminal state or suspends for
    /// clarification. Returns the state it stopped in.
    pub fn run(&mut self, answers: &mut dyn AnswerSource) -> Result<LoopState> {
        loop {
            match self.state {
                LoopState::Drafting => {
                    self.fill();
                    self.transition(LoopState::Validating)?;
                }
                LoopState::Validating => {
                    let report = self.checklist.evaluate(&self.document, &self.check_context());
                    let next = if !self.questions.is_empty() && !self.document.markers().is_empty() {
                        LoopState::ClarificationPending
                    } else if report.all_passed() {
                        LoopState::Ready
                    } else {
                        LoopState::Correcting
                    };
                    self.report = Some(report);
                    self.transition(next)?;
                }
                LoopState::ClarificationPending => match answers.answer(&self.questions) {
                    None => return Ok(self.state),
                    Some(given) => {
                        self.apply_answers(given)?;
                        self.transition(LoopState::Drafting)?;
                    }
                },
                LoopState::Correcting => {
                    if self.attempts >= self.limits.max_correction_attempts {
                        self.transition(LoopState::ReadyWithWarnings)?;
                        continue;
                    }
                    self.attempts += 1;
                    if let Some(report) = self.report.take() {
                        let mut document = std::mem::take(&mut self.document);
                        let applied =
                            self.checklist
                                .correct(&mut document, &self.check_context(), &report);
                        tracing::debug!(attempt = self.attempts, ?applied, "corrections applied");
                        self.document = document;
                        self.report = Some(report);
                    }
                    self.transition(LoopState::Validating)?;
                }
                LoopState::Ready | LoopState::ReadyWithWarnings => return Ok(self.state),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
