use crate::cmd::load_context;
use crate::output::{print_json, print_table, state_label};
use anyhow::Context;
use clap::Subcommand;
use goalkit_core::{goal, progress, types::ArtifactKind};
use std::path::Path;

#[derive(Subcommand)]
pub enum GoalsSubcommand {
    /// List all goals
    List,
    /// Show a goal's artifacts and milestones
    Show {
        /// Goal slug, number or base name
        goal: String,
    },
}

pub fn run(root: &Path, subcmd: GoalsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        GoalsSubcommand::List => list(root, json),
        GoalsSubcommand::Show { goal } => show(root, &goal, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, None)?;
    let goals = goal::list(&ctx.root).context("failed to list goals")?;

    if json {
        let items: Vec<_> = goals
            .iter()
            .map(|m| {
                serde_json::json!({
                    "slug": m.slug,
                    "title": m.title,
                    "goal_state": m.artifact(ArtifactKind::Goal).map(|r| r.state),
                    "progress": progress::summary(m),
                })
            })
            .collect();
        return print_json(&items);
    }

    if goals.is_empty() {
        println!("No goals. Create one with: goalkit goal \"<description>\"");
        return Ok(());
    }
    let rows = goals
        .iter()
        .map(|m| {
            vec![
                m.slug.clone().unwrap_or_default(),
                m.title.clone(),
                m.artifact(ArtifactKind::Goal)
                    .map(|r| r.state.as_str().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                format!("{}%", progress::summary(m).percent),
            ]
        })
        .collect();
    print_table(&["SLUG", "TITLE", "STATE", "PROGRESS"], rows);
    Ok(())
}

fn show(root: &Path, query: &str, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, Some(query))?;
    let slug = ctx.goal.clone().unwrap_or_default();
    let manifest = goal::load(&ctx.root, &slug).with_context(|| format!("failed to load goal '{slug}'"))?;

    if json {
        return print_json(&manifest);
    }

    println!("{} ({slug})", manifest.title);
    println!("Created: {}", manifest.created_at.format("%Y-%m-%d"));
    if manifest.artifacts.is_empty() {
        println!("\nNo artifacts.");
    }
    for record in &manifest.artifacts {
        println!(
            "  {:<14} {:<22} {}",
            record.kind.as_str(),
            state_label(record.state),
            record.path
        );
    }
    if !manifest.milestones.is_empty() {
        println!("\nMilestones:");
        for m in &manifest.milestones {
            let mark = if m.is_complete() { "x" } else { " " };
            let due = m.due.map(|d| format!(" (due {d})")).unwrap_or_default();
            println!("  [{mark}] {}: {}{due}  risk: {}", m.id, m.title, m.risk);
        }
    }
    Ok(())
}
