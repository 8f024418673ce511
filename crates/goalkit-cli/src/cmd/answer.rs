use crate::answers;
use crate::cmd::{generate::print_outcome, load_context};
use anyhow::Context;
use goalkit_core::types::ArtifactKind;
use goalkit_core::workflow;
use std::path::Path;

pub fn run(
    root: &Path,
    kind: ArtifactKind,
    goal: Option<&str>,
    answers: &[String],
    no_input: bool,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = load_context(root, goal)?;
    let mut source = answers::source(answers, no_input)?;
    let outcome = workflow::answer(&ctx, kind, source.as_mut())
        .with_context(|| format!("failed to resume {kind}"))?;
    print_outcome(&outcome, json)
}
