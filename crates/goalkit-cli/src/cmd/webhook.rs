use crate::cmd::load_context;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use goalkit_core::webhook::{Dispatcher, Event, EventKind, HttpTransport, Registry};
use std::path::Path;

#[derive(Subcommand)]
pub enum WebhookSubcommand {
    /// Register a webhook endpoint
    Add {
        url: String,
        /// Signing secret (default: generated)
        #[arg(long)]
        secret: Option<String>,
        /// Subscribe to specific events (repeatable); all events when omitted
        #[arg(long = "event", value_name = "EVENT")]
        events: Vec<String>,
    },
    /// List registered webhooks
    List,
    /// Remove a webhook
    Remove { id: String },
    /// Re-enable a webhook disabled after repeated failures
    Enable { id: String },
    /// Send a sample event to one webhook
    Test {
        id: String,
        /// Event to simulate
        #[arg(long, default_value = "task_completed")]
        event: String,
    },
}

pub fn run(root: &Path, subcmd: WebhookSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WebhookSubcommand::Add {
            url,
            secret,
            events,
        } => add(root, &url, secret, &events, json),
        WebhookSubcommand::List => list(root, json),
        WebhookSubcommand::Remove { id } => remove(root, &id, json),
        WebhookSubcommand::Enable { id } => enable(root, &id, json),
        WebhookSubcommand::Test { id, event } => test(root, &id, &event, json),
    }
}

fn load(root: &Path) -> anyhow::Result<Registry> {
    Registry::load(root).context("failed to load webhooks.yaml")
}

fn add(
    root: &Path,
    url: &str,
    secret: Option<String>,
    events: &[String],
    json: bool,
) -> anyhow::Result<()> {
    load_context(root, None)?;
    let events = events
        .iter()
        .map(|e| e.parse::<EventKind>())
        .collect::<Result<Vec<_>, _>>()?;
    let mut registry = load(root)?;
    let hook = registry.add(url, secret, events)?.clone();
    registry.save(root).context("failed to save webhooks.yaml")?;

    if json {
        return print_json(&hook);
    }
    println!("Registered webhook {} -> {}", hook.id, hook.url);
    println!("Secret: {}", hook.secret);
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let registry = load(root)?;
    if json {
        return print_json(&registry.webhooks);
    }
    if registry.webhooks.is_empty() {
        println!("No webhooks registered.");
        return Ok(());
    }
    let rows = registry
        .webhooks
        .iter()
        .map(|w| {
            let events = if w.events.is_empty() {
                "all".to_string()
            } else {
                w.events
                    .iter()
                    .map(|e| e.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            };
            vec![
                w.id.clone(),
                w.url.clone(),
                events,
                if w.active { "active" } else { "disabled" }.to_string(),
                w.consecutive_failures.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "URL", "EVENTS", "STATUS", "FAILURES"], rows);
    Ok(())
}

fn remove(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut registry = load(root)?;
    let hook = registry.remove(id)?;
    registry.save(root).context("failed to save webhooks.yaml")?;
    if json {
        return print_json(&serde_json::json!({ "removed": hook.id }));
    }
    println!("Removed webhook {}.", hook.id);
    Ok(())
}

fn enable(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut registry = load(root)?;
    registry.enable(id)?;
    registry.save(root).context("failed to save webhooks.yaml")?;
    if json {
        return print_json(&serde_json::json!({ "enabled": id }));
    }
    println!("Enabled webhook {id}.");
    Ok(())
}

fn test(root: &Path, id: &str, event: &str, json: bool) -> anyhow::Result<()> {
    let ctx = load_context(root, None)?;
    let kind: EventKind = event.parse()?;
    let mut registry = load(root)?;
    let transport =
        HttpTransport::new(ctx.config.webhook_timeout()).context("failed to build HTTP client")?;
    let dispatcher = Dispatcher::new(
        &transport,
        ctx.config.project.name.clone(),
        ctx.config.webhooks.failure_threshold,
    );
    let sample = Event::new(kind, serde_json::json!({ "test": true }));
    let delivery = dispatcher.deliver(registry.get_mut(id)?, &sample);
    registry.save(root).context("failed to save webhooks.yaml")?;

    if json {
        return print_json(&delivery);
    }
    match (delivery.success, delivery.status, &delivery.error) {
        (true, Some(status), _) => println!("Delivered {kind} to {id} (HTTP {status})."),
        (_, _, Some(err)) => println!("Delivery to {id} failed: {err}"),
        (_, status, _) => println!(
            "Delivery to {id} failed (HTTP {}).",
            status.map(|s| s.to_string()).unwrap_or_default()
        ),
    }
    if delivery.disabled {
        println!("Webhook {id} is now disabled.");
    }
    Ok(())
}
