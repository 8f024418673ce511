use crate::cmd::load_context;
use crate::output::print_json;
use anyhow::Context;
use goalkit_core::{paths, types::ArtifactKind};
use std::path::Path;

pub fn run(root: &Path, kind: ArtifactKind, goal: Option<&str>, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, goal)?;
    let path = paths::checklist_path(&ctx.root, kind, ctx.goal.as_deref())?;
    if !path.exists() {
        anyhow::bail!(
            "no checklist for {kind} yet: run /goalkit.{} first",
            kind.command()
        );
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "kind": kind,
            "path": paths::relative(&ctx.root, &path),
            "content": content,
        }));
    }
    print!("{content}");
    Ok(())
}
