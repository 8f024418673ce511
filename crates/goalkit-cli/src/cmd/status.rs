use crate::cmd::load_context;
use crate::output::{print_json, print_table, state_label};
use anyhow::Context;
use goalkit_core::workflow::{self, ArtifactStatus};
use std::path::Path;

fn state_cell(status: &ArtifactStatus) -> String {
    status
        .state
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, None)?;
    let status = workflow::status(&ctx).context("failed to read project status")?;

    if json {
        return print_json(&status);
    }

    println!("Project: {}", status.project);
    match status.vision.state {
        Some(s) => println!("Vision:  {}", state_label(s)),
        None => println!("Vision:  (none)"),
    }
    if let Some(s) = status.coordination.state {
        println!("Coordination: {}", state_label(s));
    }

    if status.goals.is_empty() {
        println!("\nNo goals yet.");
    } else {
        println!();
        let rows = status
            .goals
            .iter()
            .map(|g| {
                let mut row = vec![g.slug.clone()];
                row.extend(g.artifacts.iter().map(state_cell));
                row.push(format!("{}%", g.progress.percent));
                row
            })
            .collect();
        print_table(
            &[
                "SLUG",
                "GOAL",
                "STRATEGIES",
                "MILESTONES",
                "EXECUTION",
                "COLLABORATION",
                "PROGRESS",
            ],
            rows,
        );
    }

    if let Some(last) = &status.last {
        println!(
            "\nLast: {} ({}) -> {} at {}",
            last.kind,
            last.scope,
            last.outcome,
            last.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    if let Some(next) = &status.next_command {
        println!("Next: {next}");
    }
    Ok(())
}
