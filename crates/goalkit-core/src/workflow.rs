//! Command pipeline: intake, prerequisite check, scaffold, resolution loop,
//! then persistence of the artifact, its checklist and the manifests.
//!
//! Every operation takes an explicit [`WorkflowContext`]; nothing reads
//! ambient "current goal" or "current persona" state.

use crate::clarify::ClarificationQuestion;
use crate::checklist::ValidationReport;
use crate::config::Config;
use crate::document::Document;
use crate::error::{GoalkitError, Result};
use crate::goal;
use crate::intake::Intake;
use crate::io;
use crate::manifest::{ArtifactRecord, Manifest};
use crate::paths;
use crate::progress::{self, ProgressSummary};
use crate::resolution::{AnswerSource, NoAnswers, ResolutionLoop};
use crate::risk::{RiskLevel, RiskResponse};
use crate::rubric::BASED_ON;
use crate::scaffold::{self, ScaffoldPaths};
use crate::state::{HistoryEntry, State};
use crate::template::Template;
use crate::types::{ArtifactKind, ArtifactScope, LoopState};
use crate::webhook::{Delivery, Dispatcher, Event, Registry, Transport};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub root: PathBuf,
    pub config: Config,
    /// Resolved goal slug for goal-scoped commands.
    pub goal: Option<String>,
    /// Recorded as the artifact author.
    pub persona: Option<String>,
}

impl WorkflowContext {
    /// Fails with `NotInitialized` when the project has no config.
    pub fn load(root: &Path) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            config: Config::load(root)?,
            goal: None,
            persona: None,
        })
    }

    /// Resolve a goal reference (slug, number or base name).
    pub fn with_goal(mut self, goal: Option<&str>) -> Result<Self> {
        self.goal = goal.map(|g| goal::resolve(&self.root, g)).transpose()?;
        Ok(self)
    }

    pub fn with_persona(mut self, persona: Option<String>) -> Self {
        self.persona = persona.filter(|p| !p.trim().is_empty());
        self
    }

    fn goal_for(&self, kind: ArtifactKind) -> Result<Option<&str>> {
        match kind.scope() {
            ArtifactScope::Project => Ok(None),
            ArtifactScope::Goal => self
                .goal
                .as_deref()
                .map(Some)
                .ok_or_else(|| GoalkitError::GoalRequired(kind.to_string())),
        }
    }
}

/// Create `.goalkit/` with a default config and state. Existing files are
/// left alone. Returns the root-relative paths that were created.
pub fn init_project(root: &Path, project: &str) -> Result<Vec<String>> {
    let mut created = Vec::new();
    for dir in [paths::VISION_DIR, paths::GOALS_DIR, paths::COORDINATION_DIR] {
        let path = root.join(dir);
        if !path.exists() {
            io::ensure_dir(&path)?;
            created.push(dir.to_string());
        }
    }
    let config = serde_yaml::to_string(&Config::new(project))?;
    if io::write_if_missing(&paths::config_path(root), config.as_bytes())? {
        created.push(paths::CONFIG_FILE.to_string());
    }
    let state = serde_yaml::to_string(&State::new(project))?;
    if io::write_if_missing(&paths::state_path(root), state.as_bytes())? {
        created.push(paths::STATE_FILE.to_string());
    }
    io::ensure_gitignore_entry(root, paths::WEBHOOKS_FILE)?;
    Ok(created)
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub kind: ArtifactKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub state: LoopState,
    pub artifact: String,
    pub checklist: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<ClarificationQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
    pub correction_attempts: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
    /// False when a re-validation left the artifact byte-identical.
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_command: Option<String>,
}

/// What to run after `kind` reached `state`.
pub fn next_command(kind: ArtifactKind, state: LoopState, goal: Option<&str>) -> Option<String> {
    let goal_flag = goal.map(|g| format!(" --goal {g}")).unwrap_or_default();
    if state == LoopState::ClarificationPending {
        return Some(format!("goalkit answer {kind}{goal_flag} Q1=<A-D|text> ..."));
    }
    if !state.is_terminal() {
        return None;
    }
    match (kind.successor(), kind) {
        (Some(next), _) => Some(format!("/goalkit.{}", next.command())),
        (None, ArtifactKind::Execution) => goal.map(|g| format!("goalkit progress show {g}")),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Prerequisites
// ---------------------------------------------------------------------------

fn finalized_record(root: &Path, kind: ArtifactKind, goal: Option<&str>) -> Result<Option<ArtifactRecord>> {
    let dir = paths::scope_dir(root, kind, goal)?;
    Ok(Manifest::load(&dir)?
        .and_then(|m| m.artifact(kind).cloned())
        .filter(|r| root.join(&r.path).exists()))
}

/// The root-relative path of the finalized predecessor `kind` cites.
fn prerequisite(root: &Path, kind: ArtifactKind, goal: Option<&str>) -> Result<Option<String>> {
    let Some(pred) = kind.predecessor() else {
        return Ok(None);
    };
    match finalized_record(root, pred, goal)? {
        None => Err(GoalkitError::MissingPrerequisite {
            missing: pred.to_string(),
            command: pred.command().to_string(),
        }),
        Some(r) if !r.is_finalized() => Err(GoalkitError::PrerequisitePending {
            kind: pred.to_string(),
            state: r.state.to_string(),
        }),
        Some(r) => Ok(Some(r.path)),
    }
}

/// `NNN-slug: Title` for every goal whose goal artifact is finalized.
fn finalized_goals(root: &Path) -> Result<Vec<String>> {
    Ok(goal::list(root)?
        .into_iter()
        .filter(|m| m.is_finalized(ArtifactKind::Goal))
        .map(|m| format!("{}: {}", m.slug.clone().unwrap_or_default(), m.title))
        .collect())
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Run a content-generating command for `kind` (any kind but `goal`, which
/// goes through [`create_goal`]).
pub fn generate(
    ctx: &WorkflowContext,
    kind: ArtifactKind,
    input: &str,
    answers: &mut dyn AnswerSource,
) -> Result<Outcome> {
    let mut intake = Intake::parse(input)?;
    if kind == ArtifactKind::Goal {
        return create_goal(ctx, input, None, answers);
    }
    let goal = ctx.goal_for(kind)?;
    let predecessor = prerequisite(&ctx.root, kind, goal)?;
    if kind == ArtifactKind::Coordination {
        let goals = finalized_goals(&ctx.root)?;
        if goals.len() < 2 {
            return Err(GoalkitError::MissingPrerequisite {
                missing: "a second finalized goal".to_string(),
                command: ArtifactKind::Goal.command().to_string(),
            });
        }
        intake = intake.with_context("goals", goals.join("; "));
    }

    let dir = paths::scope_dir(&ctx.root, kind, goal)?;
    let manifest = match Manifest::load(&dir)? {
        Some(m) => m,
        None if kind.scope() == ArtifactScope::Project => {
            Manifest::new(ctx.config.project.name.clone(), None)
        }
        None => return Err(GoalkitError::GoalNotFound(goal.unwrap_or_default().to_string())),
    };
    run_generation(ctx, kind, goal, &dir, manifest, intake, predecessor, answers)
}

/// `/goalkit.goal`: check the vision, allocate a numbered goal directory and
/// generate its goal artifact. Re-running for a goal that never finalized
/// restarts its draft; a run that fails leaves no new directory behind.
pub fn create_goal(
    ctx: &WorkflowContext,
    input: &str,
    slug: Option<&str>,
    answers: &mut dyn AnswerSource,
) -> Result<Outcome> {
    let intake = Intake::parse(input)?;
    let predecessor = prerequisite(&ctx.root, ArtifactKind::Goal, None)?;
    let known = goal::slugs(&ctx.root)?;
    let manifest = goal::create(&ctx.root, &intake.headline(), slug)?;
    let slug = manifest.slug.clone().unwrap_or_default();
    let fresh = !known.contains(&slug);
    let dir = paths::goal_dir(&ctx.root, &slug);

    let outcome = run_generation(
        ctx,
        ArtifactKind::Goal,
        Some(&slug),
        &dir,
        manifest,
        intake,
        predecessor,
        answers,
    );
    match outcome {
        Ok(outcome) => {
            let mut state = load_state(ctx)?;
            state.add_goal(&slug);
            state.save(&ctx.root)?;
            Ok(outcome)
        }
        Err(e) => {
            if fresh {
                goal::discard(&ctx.root, &slug)?;
            }
            Err(e)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_generation(
    ctx: &WorkflowContext,
    kind: ArtifactKind,
    goal: Option<&str>,
    dir: &Path,
    mut manifest: Manifest,
    intake: Intake,
    predecessor: Option<String>,
    answers: &mut dyn AnswerSource,
) -> Result<Outcome> {
    if manifest.is_finalized(kind) {
        let name = match goal {
            Some(g) => format!("{kind} for {g}"),
            None => kind.to_string(),
        };
        return Err(GoalkitError::ArtifactFinalized(name));
    }

    let layout = scaffold::scaffold(&ctx.root, kind, goal)?;
    let layout = ScaffoldPaths::from_json(&layout.to_json()?)?;
    layout.verify(&ctx.root)?;

    let title = match kind.scope() {
        ArtifactScope::Project => ctx.config.project.name.clone(),
        ArtifactScope::Goal => manifest.title.clone(),
    };
    let mut metadata = vec![(
        "Created".to_string(),
        Utc::now().format("%Y-%m-%d").to_string(),
    )];
    if let Some(p) = &predecessor {
        metadata.push((BASED_ON.to_string(), p.clone()));
    }
    if let Some(author) = &ctx.persona {
        metadata.push(("Author".to_string(), author.clone()));
    }

    let values = intake.extract(Template::for_kind(kind));
    let mut lp = ResolutionLoop::draft(kind, ctx.config.limits(), &title, metadata.clone(), values)
        .with_predecessor(predecessor.clone());
    lp.run(answers)?;

    let artifact_path = layout
        .artifact_file(kind)
        .map(str::to_string)
        .unwrap_or_else(|| kind.filename().to_string());
    let mut record = ArtifactRecord::new(kind, artifact_path, title, intake.raw());
    record.metadata = metadata;
    record.predecessor = predecessor;
    record.author = ctx.persona.clone();
    persist(ctx, kind, goal, dir, &mut manifest, record, &lp, lp.attempts())
}

/// Resume a session suspended with open clarification questions.
pub fn answer(
    ctx: &WorkflowContext,
    kind: ArtifactKind,
    answers: &mut dyn AnswerSource,
) -> Result<Outcome> {
    let goal = ctx.goal_for(kind)?;
    let dir = paths::scope_dir(&ctx.root, kind, goal)?;
    let mut manifest = Manifest::load(&dir)?
        .ok_or_else(|| GoalkitError::ArtifactNotFound(kind.to_string()))?;
    let record = manifest
        .artifact(kind)
        .cloned()
        .ok_or_else(|| GoalkitError::ArtifactNotFound(kind.to_string()))?;
    if record.state != LoopState::ClarificationPending {
        return Err(GoalkitError::NothingPending(kind.to_string()));
    }

    let mut lp = ResolutionLoop::resume(
        kind,
        ctx.config.limits(),
        &record.title,
        record.metadata.clone(),
        record.values.clone(),
        record.questions.clone(),
    )
    .with_predecessor(record.predecessor.clone());
    lp.run(answers)?;
    persist(ctx, kind, goal, &dir, &mut manifest, record, &lp, lp.attempts())
}

/// Re-run the checklist (and bounded corrections) on a finalized artifact.
/// A passing artifact is left byte-identical.
pub fn revalidate(ctx: &WorkflowContext, kind: ArtifactKind) -> Result<Outcome> {
    let goal = ctx.goal_for(kind)?;
    let dir = paths::scope_dir(&ctx.root, kind, goal)?;
    let mut manifest = Manifest::load(&dir)?
        .ok_or_else(|| GoalkitError::ArtifactNotFound(kind.to_string()))?;
    let record = manifest
        .artifact(kind)
        .cloned()
        .ok_or_else(|| GoalkitError::ArtifactNotFound(kind.to_string()))?;
    if !record.is_finalized() {
        return Err(GoalkitError::PrerequisitePending {
            kind: kind.to_string(),
            state: record.state.to_string(),
        });
    }
    let path = ctx.root.join(&record.path);
    if !path.exists() {
        return Err(GoalkitError::ArtifactNotFound(record.path.clone()));
    }
    let document = Document::parse(&std::fs::read_to_string(&path)?);
    let mut lp = ResolutionLoop::revalidate(kind, ctx.config.limits(), document)
        .with_values(record.values.clone())
        .with_predecessor(record.predecessor.clone());
    lp.run(&mut NoAnswers)?;
    // A clean pass keeps the count from the run that produced the artifact.
    let attempts = match lp.attempts() {
        0 => record.correction_attempts,
        n => n,
    };
    persist(ctx, kind, goal, &dir, &mut manifest, record, &lp, attempts)
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// A missing `state.yaml` starts a fresh history; an unreadable one is an
/// error so the next save cannot clobber it.
fn load_state(ctx: &WorkflowContext) -> Result<State> {
    match State::load(&ctx.root) {
        Err(GoalkitError::NotInitialized) => Ok(State::new(ctx.config.project.name.clone())),
        other => other,
    }
}

#[allow(clippy::too_many_arguments)]
fn persist(
    ctx: &WorkflowContext,
    kind: ArtifactKind,
    goal: Option<&str>,
    dir: &Path,
    manifest: &mut Manifest,
    mut record: ArtifactRecord,
    lp: &ResolutionLoop,
    attempts: u32,
) -> Result<Outcome> {
    let state = lp.state();
    let artifact_path = ctx.root.join(&record.path);
    let checklist_path = paths::checklist_path(&ctx.root, kind, goal)?;

    let mut changed = io::write_if_changed(&artifact_path, lp.document().render().as_bytes())?;
    if let Some(report) = lp.report() {
        let checklist = report.render(&record.path, state, attempts);
        changed |= io::write_if_changed(&checklist_path, checklist.as_bytes())?;
    }

    let state_changed = record.state != state;
    record.values = lp.values().clone();
    record.questions = lp.questions().to_vec();
    record.correction_attempts = attempts;
    record.unresolved = lp.unresolved();
    record.set_state(state);

    if kind == ArtifactKind::Milestones && state.is_terminal() {
        progress::sync(manifest, progress::parse_milestones(lp.document()));
    }

    if changed || state_changed {
        manifest.upsert(record.clone());
        manifest.save(dir)?;
        let mut history = load_state(ctx)?;
        history.record(kind, goal, state);
        history.save(&ctx.root)?;
    }

    match state {
        LoopState::Ready => tracing::info!(kind = %kind, path = %record.path, "artifact ready"),
        LoopState::ReadyWithWarnings => tracing::warn!(
            kind = %kind,
            unresolved = ?record.unresolved,
            "artifact finalized with unresolved checklist items"
        ),
        _ => tracing::debug!(kind = %kind, state = %state, "artifact suspended"),
    }

    Ok(Outcome {
        kind,
        goal: goal.map(str::to_string),
        state,
        artifact: record.path.clone(),
        checklist: paths::relative(&ctx.root, &checklist_path),
        questions: record.questions.clone(),
        report: lp.report().cloned(),
        correction_attempts: record.correction_attempts,
        unresolved: record.unresolved.clone(),
        changed,
        next_command: next_command(kind, state, goal),
    })
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactStatus {
    pub kind: ArtifactKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<LoopState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalStatus {
    pub slug: String,
    pub title: String,
    pub artifacts: Vec<ArtifactStatus>,
    pub progress: ProgressSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_command: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatus {
    pub project: String,
    pub vision: ArtifactStatus,
    pub coordination: ArtifactStatus,
    pub goals: Vec<GoalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<HistoryEntry>,
}

const GOAL_CHAIN: [ArtifactKind; 4] = [
    ArtifactKind::Goal,
    ArtifactKind::Strategies,
    ArtifactKind::Milestones,
    ArtifactKind::Execution,
];

fn artifact_status(manifest: Option<&Manifest>, kind: ArtifactKind) -> ArtifactStatus {
    let record = manifest.and_then(|m| m.artifact(kind));
    ArtifactStatus {
        kind,
        state: record.map(|r| r.state),
        path: record.map(|r| r.path.clone()),
    }
}

fn goal_status(manifest: &Manifest) -> GoalStatus {
    let slug = manifest.slug.clone().unwrap_or_default();
    let artifacts: Vec<ArtifactStatus> = GOAL_CHAIN
        .iter()
        .chain(std::iter::once(&ArtifactKind::Collaboration))
        .map(|k| artifact_status(Some(manifest), *k))
        .collect();
    let next = GOAL_CHAIN
        .iter()
        .find_map(|k| match manifest.artifact(*k) {
            Some(r) if r.is_finalized() => None,
            Some(r) => next_command(*k, r.state, Some(slug.as_str())),
            None if *k == ArtifactKind::Goal => Some(format!(
                "/goalkit.goal --slug {}",
                slug.split_once('-').map_or(slug.as_str(), |(_, b)| b)
            )),
            None => Some(format!("/goalkit.{} --goal {slug}", k.command())),
        })
        .or_else(|| next_command(ArtifactKind::Execution, LoopState::Ready, Some(slug.as_str())));
    GoalStatus {
        title: manifest.title.clone(),
        artifacts,
        progress: progress::summary(manifest),
        next_command: next,
        slug,
    }
}

pub fn status(ctx: &WorkflowContext) -> Result<ProjectStatus> {
    let vision_manifest = Manifest::load(&ctx.root.join(paths::VISION_DIR))?;
    let coordination_manifest = Manifest::load(&ctx.root.join(paths::COORDINATION_DIR))?;
    let vision = artifact_status(vision_manifest.as_ref(), ArtifactKind::Vision);
    let goals: Vec<GoalStatus> = goal::list(&ctx.root)?.iter().map(goal_status).collect();

    let next = match vision.state {
        None => Some("/goalkit.vision".to_string()),
        Some(s) if !s.is_terminal() => next_command(ArtifactKind::Vision, s, None),
        Some(_) if goals.is_empty() => Some("/goalkit.goal".to_string()),
        Some(_) => goals.iter().find_map(|g| g.next_command.clone()),
    };

    Ok(ProjectStatus {
        project: ctx.config.project.name.clone(),
        vision,
        coordination: artifact_status(coordination_manifest.as_ref(), ArtifactKind::Coordination),
        goals,
        next_command: next,
        last: State::load(&ctx.root).ok().and_then(|s| s.last_entry().cloned()),
    })
}

// ---------------------------------------------------------------------------
// Progress and notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub events: Vec<Event>,
    pub deliveries: Vec<Delivery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskResponse>,
    pub summary: ProgressSummary,
}

/// Deliver `events` to registered webhooks and persist their bookkeeping.
pub fn notify(ctx: &WorkflowContext, events: &[Event], transport: &dyn Transport) -> Result<Vec<Delivery>> {
    if events.is_empty() {
        return Ok(Vec::new());
    }
    let mut registry = Registry::load(&ctx.root)?;
    if registry.webhooks.is_empty() {
        return Ok(Vec::new());
    }
    let dispatcher = Dispatcher::new(
        transport,
        ctx.config.project.name.clone(),
        ctx.config.webhooks.failure_threshold,
    );
    let deliveries: Vec<Delivery> = events
        .iter()
        .flat_map(|e| dispatcher.dispatch(&mut registry, e))
        .collect();
    registry.save(&ctx.root)?;
    Ok(deliveries)
}

fn goal_manifest(ctx: &WorkflowContext) -> Result<(PathBuf, Manifest)> {
    let slug = ctx
        .goal
        .as_deref()
        .ok_or_else(|| GoalkitError::GoalRequired("progress".to_string()))?;
    let dir = paths::goal_dir(&ctx.root, slug);
    Ok((dir, goal::load(&ctx.root, slug)?))
}

pub fn complete_milestone(
    ctx: &WorkflowContext,
    milestone: &str,
    transport: &dyn Transport,
) -> Result<ProgressUpdate> {
    let (dir, mut manifest) = goal_manifest(ctx)?;
    let events = progress::complete(&mut manifest, milestone)?;
    manifest.save(&dir)?;
    let deliveries = notify(ctx, &events, transport)?;
    Ok(ProgressUpdate {
        events,
        deliveries,
        risk: None,
        summary: progress::summary(&manifest),
    })
}

pub fn assess_risk(
    ctx: &WorkflowContext,
    milestone: &str,
    level: RiskLevel,
    transport: &dyn Transport,
) -> Result<ProgressUpdate> {
    let (dir, mut manifest) = goal_manifest(ctx)?;
    let (response, events) = progress::set_risk(&mut manifest, milestone, level)?;
    manifest.save(&dir)?;
    let deliveries = notify(ctx, &events, transport)?;
    Ok(ProgressUpdate {
        events,
        deliveries,
        risk: Some(*response),
        summary: progress::summary(&manifest),
    })
}

/// Deadline check across every goal.
pub fn check_deadlines(
    ctx: &WorkflowContext,
    today: NaiveDate,
    transport: &dyn Transport,
) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for slug in goal::slugs(&ctx.root)? {
        let dir = paths::goal_dir(&ctx.root, &slug);
        let Some(mut manifest) = Manifest::load(&dir)? else {
            continue;
        };
        let found = progress::check_deadlines(
            &mut manifest,
            today,
            ctx.config.progress.deadline_warning_days,
        );
        if !found.is_empty() {
            manifest.save(&dir)?;
            events.extend(found);
        }
    }
    notify(ctx, &events, transport)?;
    Ok(events)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clarify::Answer;
    use crate::resolution::PresetAnswers;
    use crate::webhook::EventKind;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct RecordingTransport {
        events: RefCell<Vec<String>>,
    }

    impl Transport for RecordingTransport {
        fn post(&self, _url: &str, headers: &[(&str, String)], _body: &[u8]) -> Result<u16> {
            if let Some((_, v)) = headers.iter().find(|(k, _)| *k == crate::webhook::EVENT_HEADER) {
                self.events.borrow_mut().push(v.clone());
            }
            Ok(200)
        }
    }

    fn setup() -> (TempDir, WorkflowContext) {
        let dir = TempDir::new().unwrap();
        init_project(dir.path(), "demo").unwrap();
        let ctx = WorkflowContext::load(dir.path()).unwrap();
        (dir, ctx)
    }

    fn preset(pairs: &[(&str, &str)]) -> PresetAnswers {
        PresetAnswers::new(
            pairs
                .iter()
                .map(|(id, a)| (id.to_string(), a.parse::<Answer>().unwrap())),
        )
    }

    fn ready_vision(ctx: &WorkflowContext) {
        let outcome = generate(
            ctx,
            ArtifactKind::Vision,
            "task app for teams",
            &mut preset(&[("Q1", "A"), ("Q2", "A"), ("Q3", "A")]),
        )
        .unwrap();
        assert_eq!(outcome.state, LoopState::Ready);
    }

    fn ready_goal(ctx: &WorkflowContext, text: &str) -> String {
        let outcome = create_goal(ctx, text, None, &mut preset(&[("Q1", "A")])).unwrap();
        assert_eq!(outcome.state, LoopState::Ready, "{:?}", outcome.report);
        outcome.goal.unwrap()
    }

    #[test]
    fn uninitialized_project_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            WorkflowContext::load(dir.path()),
            Err(GoalkitError::NotInitialized)
        ));
    }

    #[test]
    fn init_is_idempotent() {
        let (dir, _) = setup();
        assert!(init_project(dir.path(), "demo").unwrap().is_empty());
        let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".goalkit/webhooks.yaml"));
    }

    #[test]
    fn empty_input_fails_fast() {
        let (dir, ctx) = setup();
        let err = generate(&ctx, ArtifactKind::Vision, "  ", &mut NoAnswers).unwrap_err();
        assert!(matches!(err, GoalkitError::NoInput));
        assert!(!dir.path().join(".goalkit/vision/vision.md").exists());
    }

    #[test]
    fn goal_without_vision_creates_nothing() {
        let (dir, ctx) = setup();
        let err = create_goal(&ctx, "Plan the week", None, &mut NoAnswers).unwrap_err();
        assert_eq!(err.to_string(), "vision not found, run /goalkit.vision first");
        assert!(goal::slugs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn pending_vision_then_answer() {
        let (dir, ctx) = setup();
        let outcome = generate(&ctx, ArtifactKind::Vision, "task app for teams", &mut NoAnswers).unwrap();
        assert_eq!(outcome.state, LoopState::ClarificationPending);
        assert_eq!(outcome.questions.len(), 3);
        assert!(outcome.questions.iter().all(|q| q.section != "platform"));
        let draft = std::fs::read_to_string(dir.path().join(&outcome.artifact)).unwrap();
        assert_eq!(draft.matches("[NEEDS CLARIFICATION").count(), 3);

        let err = create_goal(&ctx, "Plan the week", None, &mut NoAnswers).unwrap_err();
        assert!(matches!(err, GoalkitError::PrerequisitePending { .. }));

        let done = answer(&ctx, ArtifactKind::Vision, &mut preset(&[("Q1", "B"), ("Q2", "A"), ("Q3", "C")])).unwrap();
        assert_eq!(done.state, LoopState::Ready);
        assert_eq!(done.next_command.as_deref(), Some("/goalkit.goal"));
        let text = std::fs::read_to_string(dir.path().join(&done.artifact)).unwrap();
        assert!(!text.contains("NEEDS CLARIFICATION"));
        assert!(!text.contains("N/A"));
        assert!(dir.path().join(&done.checklist).exists());

        assert!(matches!(
            answer(&ctx, ArtifactKind::Vision, &mut NoAnswers),
            Err(GoalkitError::NothingPending(_))
        ));
    }

    #[test]
    fn finalized_artifact_cannot_be_regenerated() {
        let (_dir, ctx) = setup();
        ready_vision(&ctx);
        let err = generate(&ctx, ArtifactKind::Vision, "another idea", &mut NoAnswers).unwrap_err();
        assert!(matches!(err, GoalkitError::ArtifactFinalized(_)));
    }

    #[test]
    fn revalidation_of_ready_artifact_is_a_no_op() {
        let (dir, ctx) = setup();
        ready_vision(&ctx);
        let path = dir.path().join(".goalkit/vision/vision.md");
        let before = std::fs::read(&path).unwrap();
        let outcome = revalidate(&ctx, ArtifactKind::Vision).unwrap();
        assert_eq!(outcome.state, LoopState::Ready);
        assert!(!outcome.changed);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn revalidation_keeps_earlier_correction_count() {
        let (dir, ctx) = setup();
        let first = generate(
            &ctx,
            ArtifactKind::Vision,
            "Task app for teams. Built with React.",
            &mut preset(&[("Q1", "A"), ("Q2", "A"), ("Q3", "A")]),
        )
        .unwrap();
        assert_eq!(first.state, LoopState::Ready);
        assert_eq!(first.correction_attempts, 1);

        let files = [
            dir.path().join(".goalkit/vision/vision.md"),
            dir.path().join(".goalkit/vision/checklists/vision.md"),
            dir.path().join(".goalkit/vision/manifest.yaml"),
            paths::state_path(dir.path()),
        ];
        let before: Vec<Vec<u8>> = files.iter().map(|f| std::fs::read(f).unwrap()).collect();

        let outcome = revalidate(&ctx, ArtifactKind::Vision).unwrap();
        assert_eq!(outcome.state, LoopState::Ready);
        assert!(!outcome.changed);
        assert_eq!(outcome.correction_attempts, 1);
        for (file, bytes) in files.iter().zip(&before) {
            assert_eq!(&std::fs::read(file).unwrap(), bytes, "{} changed", file.display());
        }
    }

    #[test]
    fn failed_goal_run_leaves_nothing_behind() {
        let (dir, ctx) = setup();
        ready_vision(&ctx);
        let err = create_goal(&ctx, "Plan the week", None, &mut preset(&[("Q9", "A")])).unwrap_err();
        assert!(matches!(err, GoalkitError::UnknownQuestion(_)));
        assert!(goal::slugs(dir.path()).unwrap().is_empty());
        assert!(State::load(dir.path()).unwrap().goals.is_empty());

        let pending = create_goal(&ctx, "Plan the week", None, &mut NoAnswers).unwrap();
        assert_eq!(pending.state, LoopState::ClarificationPending);
        assert_eq!(pending.goal.as_deref(), Some("001-plan-week"));

        let again = create_goal(&ctx, "Plan the week", None, &mut NoAnswers).unwrap();
        assert_eq!(again.goal.as_deref(), Some("001-plan-week"));
        assert_eq!(goal::slugs(dir.path()).unwrap(), vec!["001-plan-week"]);
        assert_eq!(State::load(dir.path()).unwrap().goals, vec!["001-plan-week"]);
    }

    #[test]
    fn goal_without_artifact_suggests_runnable_command() {
        let (dir, ctx) = setup();
        ready_vision(&ctx);
        goal::create(dir.path(), "Plan the week", None).unwrap();
        let status = status(&ctx).unwrap();
        assert_eq!(
            status.goals[0].next_command.as_deref(),
            Some("/goalkit.goal --slug plan-week")
        );
    }

    #[test]
    fn typed_markers_do_not_exceed_question_limit() {
        let (dir, ctx) = setup();
        let input = "Task app for teams [NEEDS CLARIFICATION: a] [NEEDS CLARIFICATION: b]\n[NEEDS CLARIFICATION: c] [NEEDS CLARIFICATION: d]";
        let outcome = generate(&ctx, ArtifactKind::Vision, input, &mut NoAnswers).unwrap();
        assert_eq!(outcome.state, LoopState::ClarificationPending);
        assert_eq!(outcome.questions.len(), 3);
        let draft = std::fs::read_to_string(dir.path().join(&outcome.artifact)).unwrap();
        assert_eq!(draft.matches("[NEEDS CLARIFICATION").count(), 3);
    }

    #[test]
    fn corrupt_state_file_is_not_overwritten() {
        let (dir, ctx) = setup();
        let path = paths::state_path(dir.path());
        std::fs::write(&path, "goals: [unterminated\n").unwrap();
        let err = generate(
            &ctx,
            ArtifactKind::Vision,
            "task app for teams",
            &mut preset(&[("Q1", "A"), ("Q2", "A"), ("Q3", "A")]),
        )
        .unwrap_err();
        assert!(matches!(err, GoalkitError::Yaml(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "goals: [unterminated\n");
    }

    #[test]
    fn revalidation_repairs_hand_edits() {
        let (dir, ctx) = setup();
        ready_vision(&ctx);
        let path = dir.path().join(".goalkit/vision/vision.md");
        let mut doc = Document::parse(&std::fs::read_to_string(&path).unwrap());
        doc.remove_section("Problem Statement");
        std::fs::write(&path, doc.render()).unwrap();

        let outcome = revalidate(&ctx, ArtifactKind::Vision).unwrap();
        assert_eq!(outcome.state, LoopState::Ready);
        assert!(outcome.changed);
        assert_eq!(outcome.correction_attempts, 1);
        assert!(std::fs::read_to_string(&path).unwrap().contains("## Problem Statement"));
    }

    #[test]
    fn full_goal_chain_with_progress_events() {
        let (dir, ctx) = setup();
        ready_vision(&ctx);
        let slug = ready_goal(&ctx, "Teams plan their week in under 10 minutes");
        assert_eq!(slug, "001-teams-plan-their-week");
        let goal_doc = std::fs::read_to_string(dir.path().join(".goalkit/goals/001-teams-plan-their-week/goal.md")).unwrap();
        assert!(goal_doc.contains("**Based on**: .goalkit/vision/vision.md"));

        let ctx = ctx.with_goal(Some("1")).unwrap();
        let strategies = generate(
            &ctx,
            ArtifactKind::Strategies,
            "Start narrow with a weekly planning view",
            &mut preset(&[("Q1", "A")]),
        )
        .unwrap();
        assert_eq!(strategies.state, LoopState::Ready);
        assert_eq!(strategies.next_command.as_deref(), Some("/goalkit.milestones"));

        let milestones = generate(
            &ctx,
            ArtifactKind::Milestones,
            "Ship the planner in stages\nMilestones: Foundation; Beta (due 2026-11-01)\nReview: weekly check of planning time",
            &mut NoAnswers,
        )
        .unwrap();
        assert_eq!(milestones.state, LoopState::Ready, "{:?}", milestones.report);

        let manifest = goal::load(dir.path(), &slug).unwrap();
        assert_eq!(manifest.milestones.len(), 2);

        let transport = RecordingTransport { events: RefCell::new(Vec::new()) };
        let mut registry = Registry::default();
        registry.add("https://example.com/hook", None, vec![]).unwrap();
        registry.save(dir.path()).unwrap();

        let deadline = check_deadlines(&ctx, parse_day("2026-10-30"), &transport).unwrap();
        assert_eq!(deadline.len(), 1);
        assert_eq!(deadline[0].kind, EventKind::DeadlineApproaching);

        let risk = assess_risk(&ctx, "M2", RiskLevel::High, &transport).unwrap();
        assert!(risk.risk.unwrap().escalate);

        complete_milestone(&ctx, "M1", &transport).unwrap();
        let last = complete_milestone(&ctx, "M2", &transport).unwrap();
        assert_eq!(last.summary.percent, 100);
        assert_eq!(
            *transport.events.borrow(),
            vec!["deadline_approaching", "high_risk", "task_completed", "task_completed", "goal_completed"]
        );
    }

    fn parse_day(s: &str) -> NaiveDate {
        progress::parse_date(s).unwrap()
    }

    #[test]
    fn coordination_needs_two_goals() {
        let (_dir, ctx) = setup();
        ready_vision(&ctx);
        ready_goal(&ctx, "Teams plan their week in under 10 minutes");
        let err = generate(&ctx, ArtifactKind::Coordination, "Align launches", &mut NoAnswers).unwrap_err();
        assert!(matches!(err, GoalkitError::MissingPrerequisite { .. }));

        ready_goal(&ctx, "Managers review 5 team boards weekly");
        let outcome = generate(
            &ctx,
            ArtifactKind::Coordination,
            "Align launches",
            &mut preset(&[("Q1", "B")]),
        )
        .unwrap();
        assert_eq!(outcome.state, LoopState::Ready, "{:?}", outcome.report);
    }

    #[test]
    fn status_suggests_next_step() {
        let (_dir, ctx) = setup();
        assert_eq!(status(&ctx).unwrap().next_command.as_deref(), Some("/goalkit.vision"));
        ready_vision(&ctx);
        assert_eq!(status(&ctx).unwrap().next_command.as_deref(), Some("/goalkit.goal"));
        let slug = ready_goal(&ctx, "Teams plan their week in under 10 minutes");
        let s = status(&ctx).unwrap();
        assert_eq!(
            s.next_command,
            Some(format!("/goalkit.strategies --goal {slug}"))
        );
        assert_eq!(s.goals[0].artifacts[0].state, Some(LoopState::Ready));
    }

    #[test]
    fn goal_scoped_kind_requires_goal() {
        let (_dir, ctx) = setup();
        ready_vision(&ctx);
        let err = generate(&ctx, ArtifactKind::Strategies, "x", &mut NoAnswers).unwrap_err();
        assert!(matches!(err, GoalkitError::GoalRequired(_)));
    }

    #[test]
    fn persona_is_recorded_as_author() {
        let (dir, ctx) = setup();
        let ctx = ctx.with_persona(Some("product-lead".into()));
        ready_vision(&ctx);
        let text = std::fs::read_to_string(dir.path().join(".goalkit/vision/vision.md")).unwrap();
        assert!(text.contains("**Author**: product-lead"));
    }
}
