use crate::cmd::load_context;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use goalkit_core::{
    goal, progress,
    risk::RiskLevel,
    webhook::{Delivery, Event, HttpTransport},
    workflow::{self, ProgressUpdate, WorkflowContext},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProgressSubcommand {
    /// Show milestone completion for a goal
    Show { goal: String },
    /// Mark a milestone complete
    Complete { goal: String, milestone: String },
    /// Record a risk level for a milestone and print the response plan
    Risk {
        goal: String,
        milestone: String,
        /// low | medium | high | critical
        level: String,
    },
    /// Notify about milestones due soon across all goals
    Check {
        /// Evaluate as of this date (YYYY-MM-DD, default today)
        #[arg(long)]
        today: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: ProgressSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProgressSubcommand::Show { goal } => show(root, &goal, json),
        ProgressSubcommand::Complete { goal, milestone } => complete(root, &goal, &milestone, json),
        ProgressSubcommand::Risk {
            goal,
            milestone,
            level,
        } => risk(root, &goal, &milestone, &level, json),
        ProgressSubcommand::Check { today } => check(root, today.as_deref(), json),
    }
}

fn transport(ctx: &WorkflowContext) -> anyhow::Result<HttpTransport> {
    HttpTransport::new(ctx.config.webhook_timeout()).context("failed to build HTTP client")
}

fn show(root: &Path, query: &str, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, Some(query))?;
    let slug = ctx.goal.clone().unwrap_or_default();
    let manifest = goal::load(&ctx.root, &slug)?;
    let summary = progress::summary(&manifest);

    if json {
        return print_json(&serde_json::json!({
            "goal": slug,
            "summary": summary,
            "milestones": manifest.milestones,
        }));
    }

    if manifest.milestones.is_empty() {
        println!("No milestones recorded for {slug}. Run /goalkit.milestones first.");
        return Ok(());
    }
    let rows = manifest
        .milestones
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.title.clone(),
                m.due.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                if m.is_complete() { "complete" } else { "open" }.to_string(),
                m.risk.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "DUE", "STATUS", "RISK"], rows);
    println!(
        "\n{}/{} complete ({}%)",
        summary.complete, summary.total, summary.percent
    );
    if let Some(next) = &summary.next {
        println!("Next: {next}");
    }
    Ok(())
}

fn complete(root: &Path, query: &str, milestone: &str, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, Some(query))?;
    let update = workflow::complete_milestone(&ctx, milestone, &transport(&ctx)?)
        .with_context(|| format!("failed to complete {milestone}"))?;
    if json {
        return print_json(&update);
    }
    if update.events.is_empty() {
        println!("{milestone} was already complete.");
    } else {
        println!("Completed {milestone}.");
    }
    print_update(&update);
    Ok(())
}

fn risk(root: &Path, query: &str, milestone: &str, level: &str, json: bool) -> anyhow::Result<()> {
    let level: RiskLevel = level.parse()?;
    let ctx = load_context(root, Some(query))?;
    let update = workflow::assess_risk(&ctx, milestone, level, &transport(&ctx)?)
        .with_context(|| format!("failed to record risk for {milestone}"))?;
    if json {
        return print_json(&update);
    }
    if let Some(response) = &update.risk {
        crate::cmd::risk::print_response(response);
    }
    print_update(&update);
    Ok(())
}

fn check(root: &Path, today: Option<&str>, json: bool) -> anyhow::Result<()> {
    let today = match today {
        Some(d) => progress::parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let ctx = load_context(root, None)?;
    let events = workflow::check_deadlines(&ctx, today, &transport(&ctx)?)
        .context("failed to check deadlines")?;
    if json {
        return print_json(&events);
    }
    if events.is_empty() {
        println!("No milestones due within {} days.", ctx.config.progress.deadline_warning_days);
    }
    for event in &events {
        print_event(event);
    }
    Ok(())
}

fn print_event(event: &Event) {
    let field = |k: &str| {
        event
            .data
            .get(k)
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .unwrap_or_default()
    };
    println!(
        "  {}: {} {} {}",
        event.kind,
        field("goal"),
        field("milestone"),
        field("title")
    );
}

fn print_update(update: &ProgressUpdate) {
    for event in &update.events {
        print_event(event);
    }
    for d in &update.deliveries {
        print_delivery(d);
    }
    println!(
        "Progress: {}/{} ({}%)",
        update.summary.complete, update.summary.total, update.summary.percent
    );
}

fn print_delivery(d: &Delivery) {
    let status = d
        .status
        .map(|s| s.to_string())
        .or_else(|| d.error.clone())
        .unwrap_or_default();
    let outcome = if d.success { "delivered" } else { "failed" };
    println!("  webhook {} {} {outcome} ({status})", d.webhook_id, d.event);
    if d.disabled {
        println!("  webhook {} disabled after repeated failures", d.webhook_id);
    }
}
