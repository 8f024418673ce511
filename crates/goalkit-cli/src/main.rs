mod answers;
mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, generate::GenerateArgs, goals::GoalsSubcommand,
    progress::ProgressSubcommand, webhook::WebhookSubcommand,
};
use goalkit_core::types::ArtifactKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "goalkit",
    about = "Goal-driven planning: turn short descriptions into validated vision, goal and milestone documents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .goalkit/ or .git/)
    #[arg(long, global = true, env = "GOALKIT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize goalkit in the current project
    Init {
        /// Project name (defaults to the root directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Create or refine the project vision (/goalkit.vision)
    Vision {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Define a new goal (/goalkit.goal)
    Goal {
        /// Slug base for the goal directory (default: derived from the text)
        #[arg(long)]
        slug: Option<String>,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Explore strategies for a goal (/goalkit.strategies)
    Strategies {
        #[arg(long)]
        goal: String,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Plan measurable milestones for a goal (/goalkit.milestones)
    Milestones {
        #[arg(long)]
        goal: String,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Plan execution for the current milestone (/goalkit.execute)
    Execute {
        #[arg(long)]
        goal: String,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Describe how people and agents work together on a goal (/goalkit.collaborate)
    Collaborate {
        #[arg(long)]
        goal: String,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Coordinate dependencies across goals (/goalkit.coordinate)
    Coordinate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Answer pending clarification questions and resume
    Answer {
        #[arg(value_parser = cmd::parse_kind)]
        kind: ArtifactKind,
        #[arg(long)]
        goal: Option<String>,
        /// Answers as Qn=<A-D|free text>; prompts when omitted
        answers: Vec<String>,
        /// Never prompt
        #[arg(long)]
        no_input: bool,
    },

    /// Re-run the quality checklist on a finalized artifact
    Validate {
        #[arg(value_parser = cmd::parse_kind)]
        kind: ArtifactKind,
        #[arg(long)]
        goal: Option<String>,
    },

    /// Show vision, goal and artifact states with the next suggested command
    Status,

    /// List and inspect goals
    Goals {
        #[command(subcommand)]
        subcommand: GoalsSubcommand,
    },

    /// Print the quality checklist for an artifact
    Checklist {
        #[arg(value_parser = cmd::parse_kind)]
        kind: ArtifactKind,
        #[arg(long)]
        goal: Option<String>,
    },

    /// Create directories for an artifact and print the path contract as JSON
    Setup {
        #[arg(value_parser = cmd::parse_kind)]
        kind: ArtifactKind,
        #[arg(long)]
        goal: Option<String>,
    },

    /// Track milestone progress, risk and deadlines
    Progress {
        #[command(subcommand)]
        subcommand: ProgressSubcommand,
    },

    /// Manage webhook subscriptions
    Webhook {
        #[command(subcommand)]
        subcommand: WebhookSubcommand,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Show the response plan for a risk level
    Risk { level: String },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let json = cli.json;

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), json),
        Commands::Vision { args } => {
            cmd::generate::run(&root, ArtifactKind::Vision, None, args, json)
        }
        Commands::Goal { slug, args } => cmd::generate::run_goal(&root, slug.as_deref(), args, json),
        Commands::Strategies { goal, args } => {
            cmd::generate::run(&root, ArtifactKind::Strategies, Some(&goal), args, json)
        }
        Commands::Milestones { goal, args } => {
            cmd::generate::run(&root, ArtifactKind::Milestones, Some(&goal), args, json)
        }
        Commands::Execute { goal, args } => {
            cmd::generate::run(&root, ArtifactKind::Execution, Some(&goal), args, json)
        }
        Commands::Collaborate { goal, args } => {
            cmd::generate::run(&root, ArtifactKind::Collaboration, Some(&goal), args, json)
        }
        Commands::Coordinate { args } => {
            cmd::generate::run(&root, ArtifactKind::Coordination, None, args, json)
        }
        Commands::Answer {
            kind,
            goal,
            answers,
            no_input,
        } => cmd::answer::run(&root, kind, goal.as_deref(), &answers, no_input, json),
        Commands::Validate { kind, goal } => cmd::validate::run(&root, kind, goal.as_deref(), json),
        Commands::Status => cmd::status::run(&root, json),
        Commands::Goals { subcommand } => cmd::goals::run(&root, subcommand, json),
        Commands::Checklist { kind, goal } => {
            cmd::checklist::run(&root, kind, goal.as_deref(), json)
        }
        Commands::Setup { kind, goal } => cmd::setup::run(&root, kind, goal.as_deref()),
        Commands::Progress { subcommand } => cmd::progress::run(&root, subcommand, json),
        Commands::Webhook { subcommand } => cmd::webhook::run(&root, subcommand, json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, json),
        Commands::Risk { level } => cmd::risk::run(&level, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
