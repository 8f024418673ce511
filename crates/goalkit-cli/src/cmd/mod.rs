pub mod answer;
pub mod checklist;
pub mod config;
pub mod generate;
pub mod goals;
pub mod init;
pub mod progress;
pub mod risk;
pub mod setup;
pub mod status;
pub mod validate;
pub mod webhook;

use anyhow::Context;
use goalkit_core::types::ArtifactKind;
use goalkit_core::workflow::WorkflowContext;
use std::path::Path;

pub fn parse_kind(s: &str) -> Result<ArtifactKind, String> {
    s.parse().map_err(|e: goalkit_core::GoalkitError| e.to_string())
}

/// Load the project context and resolve the optional goal reference.
pub fn load_context(root: &Path, goal: Option<&str>) -> anyhow::Result<WorkflowContext> {
    let ctx = WorkflowContext::load(root).context("failed to load project")?;
    ctx.with_goal(goal)
        .with_context(|| format!("failed to resolve goal '{}'", goal.unwrap_or_default()))
}
