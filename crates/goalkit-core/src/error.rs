use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoalkitError {
    #[error("not initialized: run 'goalkit init'")]
    NotInitialized,

    #[error("no input provided: describe what you want to create")]
    NoInput,

    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),

    #[error("{missing} not found, run /goalkit.{command} first")]
    MissingPrerequisite { missing: String, command: String },

    #[error("{kind} is not finalized ({state}): run 'goalkit answer {kind}' to resume it")]
    PrerequisitePending { kind: String, state: String },

    #[error("{0} requires a goal: pass --goal <slug>")]
    GoalRequired(String),

    #[error("goal not found: {0}")]
    GoalNotFound(String),

    #[error("goal already exists: {0}")]
    GoalExists(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("{0} is already finalized: run 'goalkit validate' to re-validate it")]
    ArtifactFinalized(String),

    #[error("{0} has no pending clarification questions")]
    NothingPending(String),

    #[error("unknown clarification question: {0}")]
    UnknownQuestion(String),

    #[error("unknown option '{option}' for question {question}")]
    UnknownOption { question: String, option: String },

    #[error("unanswered clarification questions: {0}")]
    UnansweredQuestions(String),

    #[error("invalid loop transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invalid scaffold output: {0}")]
    InvalidScaffold(String),

    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("invalid risk level: {0}")]
    InvalidRiskLevel(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("webhook not found: {0}")]
    WebhookNotFound(String),

    #[error("unknown webhook event: {0}")]
    UnknownEvent(String),

    #[error("invalid webhook url '{0}': must start with http:// or https://")]
    InvalidWebhookUrl(String),

    #[error("webhook signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GoalkitError>;
