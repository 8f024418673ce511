use crate::error::{GoalkitError, Result};
use crate::paths;
use crate::types::{ArtifactKind, LoopState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const HISTORY_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: ArtifactKind,
    /// Goal slug for goal-scoped artifacts, `project` otherwise.
    pub scope: String,
    pub outcome: LoopState,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub last_updated: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl State {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: project.into(),
            goals: Vec::new(),
            history: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::state_path(root);
        if !path.exists() {
            return Err(GoalkitError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let state: State = serde_yaml::from_str(&data)?;
        Ok(state)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::state_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn add_goal(&mut self, slug: &str) {
        if !self.goals.iter().any(|g| g == slug) {
            self.goals.push(slug.to_string());
        }
        self.last_updated = Utc::now();
    }

    pub fn record(&mut self, kind: ArtifactKind, goal: Option<&str>, outcome: LoopState) {
        self.history.push(HistoryEntry {
            kind,
            scope: goal.unwrap_or("project").to_string(),
            outcome,
            timestamp: Utc::now(),
        });
        if self.history.len() > HISTORY_LIMIT {
            self.history.drain(..self.history.len() - HISTORY_LIMIT);
        }
        self.last_updated = Utc::now();
    }

    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
