//! Directory setup for one artifact and the JSON handed to external agents.
//!
//! The JSON is the contract: `ARTIFACT_DIR`, `GOAL_DIR` and `BRANCH_NAME`
//! (goal-scoped kinds only), `<KIND>_FILE` and `CHECKLIST_FILE`, all
//! root-relative. Consumers re-read it with [`ScaffoldPaths::from_json`] and
//! check it with [`ScaffoldPaths::verify`], which validates existence and
//! path shape only.

use crate::error::{GoalkitError, Result};
use crate::paths;
use crate::types::{ArtifactKind, ArtifactScope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};

pub const CHECKLIST_KEY: &str = "CHECKLIST_FILE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldPaths {
    #[serde(rename = "ARTIFACT_DIR")]
    pub artifact_dir: String,
    #[serde(rename = "GOAL_DIR", default, skip_serializing_if = "Option::is_none")]
    pub goal_dir: Option<String>,
    #[serde(rename = "BRANCH_NAME", default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(flatten)]
    pub files: BTreeMap<String, String>,
}

/// Create the directories for `kind` and describe where its files go.
pub fn scaffold(root: &Path, kind: ArtifactKind, goal: Option<&str>) -> Result<ScaffoldPaths> {
    let dir = paths::scope_dir(root, kind, goal)?;
    crate::io::ensure_dir(&dir.join(paths::CHECKLISTS_DIR))?;

    let mut files = BTreeMap::new();
    files.insert(
        kind.file_key(),
        paths::relative(root, &paths::artifact_path(root, kind, goal)?),
    );
    files.insert(
        CHECKLIST_KEY.to_string(),
        paths::relative(root, &paths::checklist_path(root, kind, goal)?),
    );

    let rel_dir = paths::relative(root, &dir);
    let goal_scoped = kind.scope() == ArtifactScope::Goal;
    Ok(ScaffoldPaths {
        goal_dir: goal_scoped.then(|| rel_dir.clone()),
        branch_name: if goal_scoped { goal.map(str::to_string) } else { None },
        artifact_dir: rel_dir,
        files,
    })
}

impl ScaffoldPaths {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn artifact_file(&self, kind: ArtifactKind) -> Option<&str> {
        self.files.get(&kind.file_key()).map(String::as_str)
    }

    pub fn checklist_file(&self) -> Option<&str> {
        self.files.get(CHECKLIST_KEY).map(String::as_str)
    }

    /// The artifact directory exists, and every path is relative, free of
    /// `..`, inside that directory and has an existing parent.
    pub fn verify(&self, root: &Path) -> Result<()> {
        check_shape("ARTIFACT_DIR", &self.artifact_dir)?;
        if !root.join(&self.artifact_dir).is_dir() {
            return Err(GoalkitError::InvalidScaffold(format!(
                "ARTIFACT_DIR {} does not exist",
                self.artifact_dir
            )));
        }
        if let Some(goal_dir) = &self.goal_dir {
            check_shape("GOAL_DIR", goal_dir)?;
            if goal_dir != &self.artifact_dir {
                return Err(GoalkitError::InvalidScaffold(format!(
                    "GOAL_DIR {goal_dir} differs from ARTIFACT_DIR {}",
                    self.artifact_dir
                )));
            }
        }
        if self.checklist_file().is_none() {
            return Err(GoalkitError::InvalidScaffold(format!("{CHECKLIST_KEY} missing")));
        }
        for (key, file) in &self.files {
            check_shape(key, file)?;
            if !Path::new(file).starts_with(&self.artifact_dir) {
                return Err(GoalkitError::InvalidScaffold(format!(
                    "{key} {file} is outside {}",
                    self.artifact_dir
                )));
            }
            let parent_ok = root
                .join(file)
                .parent()
                .map(Path::is_dir)
                .unwrap_or(false);
            if !parent_ok {
                return Err(GoalkitError::InvalidScaffold(format!(
                    "{key} {file} has no parent directory"
                )));
            }
        }
        Ok(())
    }
}

fn check_shape(key: &str, value: &str) -> Result<()> {
    let path = Path::new(value);
    if value.is_empty()
        || path.is_absolute()
        || path.components().any(|c| matches!(c, Component::ParentDir))
    {
        return Err(GoalkitError::InvalidScaffold(format!(
            "{key} must be a relative path inside the project: {value:?}"
        )));
    }
    Ok(())
}
