use crate::answers;
use crate::cmd::load_context;
use crate::output::{print_json, state_label};
use anyhow::Context;
use clap::Args;
use console::style;
use goalkit_core::types::{ArtifactKind, LoopState};
use goalkit_core::workflow::{self, Outcome};
use std::path::Path;

#[derive(Args)]
pub struct GenerateArgs {
    /// Description of what to create
    pub text: Vec<String>,

    /// Pre-answer a clarification question (repeatable: --answer Q1=A --answer "Q2=Managers")
    #[arg(long = "answer", value_name = "Qn=ANSWER")]
    pub answers: Vec<String>,

    /// Never prompt; leave open questions pending
    #[arg(long)]
    pub no_input: bool,

    /// Recorded as the artifact author
    #[arg(long, env = "GOALKIT_PERSONA")]
    pub persona: Option<String>,
}

impl GenerateArgs {
    fn text(&self) -> String {
        self.text.join(" ")
    }
}

pub fn run(
    root: &Path,
    kind: ArtifactKind,
    goal: Option<&str>,
    args: GenerateArgs,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = load_context(root, goal)?.with_persona(args.persona.clone());
    let mut source = answers::source(&args.answers, args.no_input)?;
    let outcome = workflow::generate(&ctx, kind, &args.text(), source.as_mut())
        .with_context(|| format!("failed to generate {kind}"))?;
    print_outcome(&outcome, json)
}

pub fn run_goal(root: &Path, slug: Option<&str>, args: GenerateArgs, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, None)?.with_persona(args.persona.clone());
    let mut source = answers::source(&args.answers, args.no_input)?;
    let outcome = workflow::create_goal(&ctx, &args.text(), slug, source.as_mut())
        .context("failed to create goal")?;
    print_outcome(&outcome, json)
}

/// Shared by every command that runs the resolution loop.
pub fn print_outcome(outcome: &Outcome, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(outcome);
    }

    let scope = outcome
        .goal
        .as_deref()
        .map(|g| format!(" ({g})"))
        .unwrap_or_default();
    println!(
        "{}{scope}: {}",
        style(outcome.kind.as_str()).bold(),
        state_label(outcome.state)
    );
    println!("  Artifact:  {}", outcome.artifact);
    println!("  Checklist: {}", outcome.checklist);
    if outcome.correction_attempts > 0 {
        println!("  Correction attempts: {}", outcome.correction_attempts);
    }
    if !outcome.changed && outcome.state.is_terminal() {
        println!("  No changes.");
    }

    if outcome.state == LoopState::ClarificationPending {
        for q in &outcome.questions {
            println!();
            println!("{}", q.render());
        }
    }
    if !outcome.unresolved.is_empty() {
        println!();
        println!(
            "{} unresolved checklist items: {}",
            style("warning:").yellow().bold(),
            outcome.unresolved.join(", ")
        );
    }
    if let Some(next) = &outcome.next_command {
        println!();
        println!("Next: {next}");
    }
    Ok(())
}
