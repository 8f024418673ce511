use crate::clarify::{ClarificationQuestion, ResolvedValue};
use crate::error::Result;
use crate::paths;
use crate::progress::MilestoneProgress;
use crate::types::{ArtifactKind, LoopState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ArtifactRecord
// ---------------------------------------------------------------------------

/// Everything needed to resume or re-validate one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    /// Root-relative path of the markdown file.
    pub path: String,
    pub state: LoopState,
    pub title: String,
    /// The raw input the artifact was generated from.
    pub seed: String,
    #[serde(default)]
    pub metadata: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, ResolvedValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<ClarificationQuestion>,
    #[serde(default)]
    pub correction_attempts: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl ArtifactRecord {
    pub fn new(kind: ArtifactKind, path: impl Into<String>, title: impl Into<String>, seed: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            kind,
            path: path.into(),
            state: LoopState::Drafting,
            title: title.into(),
            seed: seed.into(),
            metadata: Vec::new(),
            values: BTreeMap::new(),
            questions: Vec::new(),
            correction_attempts: 0,
            unresolved: Vec::new(),
            predecessor: None,
            author: None,
            created_at: now,
            updated_at: now,
            finalized_at: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.state.is_terminal()
    }

    /// Record the state the loop stopped in.
    pub fn set_state(&mut self, state: LoopState) {
        let now = Utc::now();
        if state.is_terminal() && self.finalized_at.is_none() {
            self.finalized_at = Some(now);
        }
        self.state = state;
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// `manifest.yaml` of one artifact directory (the vision dir, a goal dir or
/// the coordination dir).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<MilestoneProgress>,
}

impl Manifest {
    pub fn new(title: impl Into<String>, slug: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            slug,
            created_at: now,
            updated_at: now,
            artifacts: Vec::new(),
            milestones: Vec::new(),
        }
    }

    /// `None` when the directory has no manifest yet.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = paths::manifest_path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(Some(serde_yaml::from_str(&data)?))
    }

    pub fn save(&mut self, dir: &Path) -> Result<()> {
        self.updated_at = Utc::now();
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::manifest_path(dir), data.as_bytes())
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactRecord> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    pub fn artifact_mut(&mut self, kind: ArtifactKind) -> Option<&mut ArtifactRecord> {
        self.artifacts.iter_mut().find(|a| a.kind == kind)
    }

    /// Insert or replace the record for `record.kind`.
    pub fn upsert(&mut self, record: ArtifactRecord) {
        match self.artifact_mut(record.kind) {
            Some(existing) => *existing = record,
            None => self.artifacts.push(record),
        }
    }

    pub fn is_finalized(&self, kind: ArtifactKind) -> bool {
        self.artifact(kind).map(|a| a.is_finalized()).unwrap_or(false)
    }
}
