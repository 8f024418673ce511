use crate::clarify::Resolver;
use crate::error::{GoalkitError, Result};
use crate::paths;
use crate::resolution::LoopLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

pub const MAX_CORRECTION_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationConfig {
    /// Values above 3 are clamped.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
}

fn default_max_questions() -> usize {
    Resolver::HARD_CAP
}

impl Default for ClarificationConfig {
    fn default() -> Self {
        Self {
            max_questions: default_max_questions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_max_attempts")]
    pub max_correction_attempts: u32,
}

fn default_max_attempts() -> u32 {
    MAX_CORRECTION_ATTEMPTS
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_correction_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_failure_threshold() -> u32 {
    10
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_warning_days")]
    pub deadline_warning_days: i64,
}

fn default_warning_days() -> i64 {
    7
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            deadline_warning_days: default_warning_days(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub clarification: ClarificationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            clarification: ClarificationConfig::default(),
            validation: ValidationConfig::default(),
            webhooks: WebhookConfig::default(),
            progress: ProgressConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(GoalkitError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Loop limits with both caps enforced.
    pub fn limits(&self) -> LoopLimits {
        LoopLimits {
            max_questions: self.clarification.max_questions.min(Resolver::HARD_CAP),
            max_correction_attempts: self
                .validation
                .max_correction_attempts
                .min(MAX_CORRECTION_ATTEMPTS),
        }
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhooks.timeout_seconds.max(1))
    }

    /// Check the config for values that are out of range or will be clamped.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "project.name is empty".to_string(),
            });
        }

        if self.clarification.max_questions > Resolver::HARD_CAP {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "clarification.max_questions={} is clamped to {}",
                    self.clarification.max_questions,
                    Resolver::HARD_CAP
                ),
            });
        }

        if self.validation.max_correction_attempts > MAX_CORRECTION_ATTEMPTS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "validation.max_correction_attempts={} is clamped to {}",
                    self.validation.max_correction_attempts, MAX_CORRECTION_ATTEMPTS
                ),
            });
        }

        if self.webhooks.failure_threshold == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "webhooks.failure_threshold must be at least 1".to_string(),
            });
        }

        if self.webhooks.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "webhooks.timeout_seconds must be at least 1".to_string(),
            });
        }

        if self.progress.deadline_warning_days < 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "progress.deadline_warning_days={} must not be negative",
                    self.progress.deadline_warning_days
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("test-project");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.project.name, "test-project");
        assert_eq!(parsed.clarification.max_questions, 3);
        assert_eq!(parsed.webhooks.failure_threshold, 10);
        assert!(parsed.validate().is_empty());
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: demo\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.validation.max_correction_attempts, 3);
        assert_eq!(cfg.progress.deadline_warning_days, 7);
        assert_eq!(cfg.webhook_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn oversized_limits_are_clamped_and_warned() {
        let mut cfg = Config::new("demo");
        cfg.clarification.max_questions = 9;
        cfg.validation.max_correction_attempts = 20;
        let limits = cfg.limits();
        assert_eq!(limits.max_questions, 3);
        assert_eq!(limits.max_correction_attempts, 3);
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Warning));
    }

    #[test]
    fn zero_threshold_is_an_error() {
        let mut cfg = Config::new("demo");
        cfg.webhooks.failure_threshold = 0;
        assert!(cfg.validate().iter().any(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn load_requires_init() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(Config::load(dir.path()), Err(GoalkitError::NotInitialized)));
        Config::new("demo").save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().project.name, "demo");
    }
}
