use crate::document::Document;
use crate::error::{GoalkitError, Result};
use crate::manifest::Manifest;
use crate::risk::{RiskLevel, RiskResponse};
use crate::webhook::{Event, EventKind};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const PLAN_HEADING: &str = "Milestone Plan";

static ENTRY_RE: OnceLock<Regex> = OnceLock::new();
static DUE_RE: OnceLock<Regex> = OnceLock::new();

fn entry_re() -> &'static Regex {
    ENTRY_RE.get_or_init(|| Regex::new(r"^###\s+(M\d+):\s*(.+?)\s*$").unwrap())
}

fn due_re() -> &'static Regex {
    DUE_RE.get_or_init(|| Regex::new(r"^\*\*Due\*\*:\s*(\S+)").unwrap())
}

// ---------------------------------------------------------------------------
// MilestoneProgress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Open,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneProgress {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    pub status: MilestoneStatus,
    #[serde(default)]
    pub risk: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// A `deadline_approaching` event was already sent for this milestone.
    #[serde(default)]
    pub deadline_notified: bool,
}

impl MilestoneProgress {
    pub fn new(id: impl Into<String>, title: impl Into<String>, due: Option<NaiveDate>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due,
            status: MilestoneStatus::Open,
            risk: RiskLevel::Low,
            completed_at: None,
            deadline_notified: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == MilestoneStatus::Complete
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| GoalkitError::InvalidDate(s.to_string()))
}

/// Read `### M<n>: <title>` entries (and their `**Due**` lines) from the
/// milestone plan. Entries with unparseable dates keep no due date.
pub fn parse_milestones(doc: &Document) -> Vec<MilestoneProgress> {
    let Some(plan) = doc.section(PLAN_HEADING) else {
        return Vec::new();
    };
    let mut out: Vec<MilestoneProgress> = Vec::new();
    for line in plan.body.lines().map(str::trim) {
        if let Some(caps) = entry_re().captures(line) {
            out.push(MilestoneProgress::new(&caps[1], &caps[2], None));
        } else if let (Some(caps), Some(last)) = (due_re().captures(line), out.last_mut()) {
            last.due = parse_date(&caps[1]).ok();
        }
    }
    out
}

/// Replace the tracked milestones with `parsed`, keeping status, risk and
/// notification state of ids that survive.
pub fn sync(manifest: &mut Manifest, parsed: Vec<MilestoneProgress>) {
    let previous = std::mem::take(&mut manifest.milestones);
    manifest.milestones = parsed
        .into_iter()
        .map(|mut m| {
            if let Some(old) = previous.iter().find(|p| p.id == m.id) {
                m.status = old.status;
                m.risk = old.risk;
                m.completed_at = old.completed_at;
                m.deadline_notified = old.deadline_notified && old.due == m.due;
            }
            m
        })
        .collect();
}

fn find_mut<'a>(manifest: &'a mut Manifest, id: &str) -> Result<&'a mut MilestoneProgress> {
    manifest
        .milestones
        .iter_mut()
        .find(|m| m.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| GoalkitError::MilestoneNotFound(id.to_string()))
}

fn goal_name(manifest: &Manifest) -> String {
    manifest.slug.clone().unwrap_or_else(|| manifest.title.clone())
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Mark a milestone complete. Emits `task_completed`, plus `goal_completed`
/// when it was the last open one. Completing twice emits nothing.
pub fn complete(manifest: &mut Manifest, id: &str) -> Result<Vec<Event>> {
    let goal = goal_name(manifest);
    let milestone = find_mut(manifest, id)?;
    if milestone.is_complete() {
        return Ok(Vec::new());
    }
    milestone.status = MilestoneStatus::Complete;
    milestone.completed_at = Some(Utc::now());
    let mut events = vec![Event::new(
        EventKind::TaskCompleted,
        serde_json::json!({
            "goal": goal,
            "milestone": milestone.id,
            "title": milestone.title,
        }),
    )];
    if manifest.milestones.iter().all(MilestoneProgress::is_complete) {
        events.push(Event::new(
            EventKind::GoalCompleted,
            serde_json::json!({
                "goal": goal,
                "title": manifest.title,
                "milestones": manifest.milestones.len(),
            }),
        ));
    }
    Ok(events)
}

/// Record a risk level and look up the response. Notifying levels emit
/// `high_risk`.
pub fn set_risk(
    manifest: &mut Manifest,
    id: &str,
    level: RiskLevel,
) -> Result<(&'static RiskResponse, Vec<Event>)> {
    let goal = goal_name(manifest);
    let milestone = find_mut(manifest, id)?;
    milestone.risk = level;
    let response = level.response();
    let mut events = Vec::new();
    if response.notify {
        events.push(Event::new(
            EventKind::HighRisk,
            serde_json::json!({
                "goal": goal,
                "milestone": milestone.id,
                "title": milestone.title,
                "level": level,
                "escalate": response.escalate,
                "pause_new_work": response.pause_new_work,
            }),
        ));
    }
    Ok((response, events))
}

/// `deadline_approaching` for every open milestone due within
/// `warning_days` of `today` (overdue included), once per milestone.
pub fn check_deadlines(manifest: &mut Manifest, today: NaiveDate, warning_days: i64) -> Vec<Event> {
    let goal = goal_name(manifest);
    let mut events = Vec::new();
    for m in manifest.milestones.iter_mut() {
        let Some(due) = m.due else { continue };
        if m.is_complete() || m.deadline_notified {
            continue;
        }
        let days_left = (due - today).num_days();
        if days_left <= warning_days {
            m.deadline_notified = true;
            events.push(Event::new(
                EventKind::DeadlineApproaching,
                serde_json::json!({
                    "goal": goal,
                    "milestone": m.id,
                    "title": m.title,
                    "due": due.to_string(),
                    "days_remaining": days_left,
                }),
            ));
        }
    }
    events
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub complete: usize,
    pub percent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

pub fn summary(manifest: &Manifest) -> ProgressSummary {
    let total = manifest.milestones.len();
    let complete = manifest.milestones.iter().filter(|m| m.is_complete()).count();
    let percent = if total == 0 {
        0
    } else {
        (complete * 100 / total) as u32
    };
    ProgressSummary {
        total,
        complete,
        percent,
        next: manifest
            .milestones
            .iter()
            .find(|m| !m.is_complete())
            .map(|m| m.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "# Milestones: beta\n\n## Milestone Plan\n\n### M1: Foundation\n\n**Success indicator**: 5 pilot users\n\n### M2: Beta\n\n**Due**: 2026-11-01\n\n### M3: Launch\n\n**Due**: someday\n";

    fn manifest() -> Manifest {
        let mut m = Manifest::new("Beta", Some("001-beta".into()));
        sync(&mut m, parse_milestones(&Document::parse(PLAN)));
        m
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn parses_entries_and_due_dates() {
        let parsed = parse_milestones(&Document::parse(PLAN));
        let ids: Vec<_> = parsed.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2", "M3"]);
        assert_eq!(parsed[0].due, None);
        assert_eq!(parsed[1].due, Some(date("2026-11-01")));
        assert_eq!(parsed[2].due, None);
        assert_eq!(parsed[1].title, "Beta");
    }

    #[test]
    fn completing_all_emits_goal_completed() {
        let mut m = manifest();
        let first = complete(&mut m, "M1").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, EventKind::TaskCompleted);
        assert!(complete(&mut m, "m1").unwrap().is_empty());
        complete(&mut m, "M2").unwrap();
        let last = complete(&mut m, "M3").unwrap();
        let kinds: Vec<_> = last.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::TaskCompleted, EventKind::GoalCompleted]);
        assert_eq!(summary(&m).percent, 100);
        assert!(matches!(complete(&mut m, "M9"), Err(GoalkitError::MilestoneNotFound(_))));
    }

    #[test]
    fn high_risk_notifies() {
        let mut m = manifest();
        let (response, events) = set_risk(&mut m, "M2", RiskLevel::Medium).unwrap();
        assert!(!response.notify);
        assert!(events.is_empty());
        let (response, events) = set_risk(&mut m, "M2", RiskLevel::Critical).unwrap();
        assert!(response.pause_new_work);
        assert_eq!(events[0].kind, EventKind::HighRisk);
        assert_eq!(m.milestones[1].risk, RiskLevel::Critical);
    }

    #[test]
    fn deadlines_notify_once_within_window() {
        let mut m = manifest();
        assert!(check_deadlines(&mut m, date("2026-10-01"), 7).is_empty());
        let events = check_deadlines(&mut m, date("2026-10-28"), 7);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data["days_remaining"], 4);
        assert!(check_deadlines(&mut m, date("2026-10-29"), 7).is_empty());
    }

    #[test]
    fn sync_keeps_progress_of_surviving_ids() {
        let mut m = manifest();
        complete(&mut m, "M1").unwrap();
        let replanned = "## Milestone Plan\n\n### M1: Foundation\n\n### M2: Public beta\n";
        sync(&mut m, parse_milestones(&Document::parse(replanned)));
        assert_eq!(m.milestones.len(), 2);
        assert!(m.milestones[0].is_complete());
        assert_eq!(m.milestones[1].title, "Public beta");
        assert_eq!(summary(&m).percent, 50);
        assert_eq!(summary(&m).next.as_deref(), Some("M2"));
    }
}
