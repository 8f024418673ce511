use crate::cmd::{generate::print_outcome, load_context};
use anyhow::Context;
use goalkit_core::types::ArtifactKind;
use goalkit_core::workflow;
use std::path::Path;

pub fn run(root: &Path, kind: ArtifactKind, goal: Option<&str>, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, goal)?;
    let outcome =
        workflow::revalidate(&ctx, kind).with_context(|| format!("failed to validate {kind}"))?;
    print_outcome(&outcome, json)
}
