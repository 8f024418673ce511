use crate::cmd::load_context;
use anyhow::Context;
use goalkit_core::{scaffold, types::ArtifactKind};
use std::path::Path;

/// Always prints JSON: this is the contract external agents read.
pub fn run(root: &Path, kind: ArtifactKind, goal: Option<&str>) -> anyhow::Result<()> {
    let ctx = load_context(root, goal)?;
    let layout = scaffold::scaffold(&ctx.root, kind, ctx.goal.as_deref())
        .with_context(|| format!("failed to set up {kind}"))?;
    layout.verify(&ctx.root).context("scaffold verification failed")?;
    println!("{}", layout.to_json()?);
    Ok(())
}
