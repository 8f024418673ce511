use crate::error::{GoalkitError, Result};
use crate::types::{ArtifactKind, ArtifactScope};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const GOALKIT_DIR: &str = ".goalkit";
pub const VISION_DIR: &str = ".goalkit/vision";
pub const GOALS_DIR: &str = ".goalkit/goals";
pub const COORDINATION_DIR: &str = ".goalkit/coordination";

pub const CONFIG_FILE: &str = ".goalkit/config.yaml";
pub const STATE_FILE: &str = ".goalkit/state.yaml";
pub const WEBHOOKS_FILE: &str = ".goalkit/webhooks.yaml";

pub const CHECKLISTS_DIR: &str = "checklists";
pub const MANIFEST_FILE: &str = "manifest.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn goalkit_dir(root: &Path) -> PathBuf {
    root.join(GOALKIT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn webhooks_path(root: &Path) -> PathBuf {
    root.join(WEBHOOKS_FILE)
}

pub fn goal_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(GOALS_DIR).join(slug)
}

/// Directory holding artifacts of `kind`. Goal-scoped kinds need `goal`.
pub fn scope_dir(root: &Path, kind: ArtifactKind, goal: Option<&str>) -> Result<PathBuf> {
    match (kind, kind.scope()) {
        (ArtifactKind::Coordination, _) => Ok(root.join(COORDINATION_DIR)),
        (_, ArtifactScope::Project) => Ok(root.join(VISION_DIR)),
        (_, ArtifactScope::Goal) => goal
            .map(|g| goal_dir(root, g))
            .ok_or_else(|| GoalkitError::GoalRequired(kind.to_string())),
    }
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

pub fn artifact_path(root: &Path, kind: ArtifactKind, goal: Option<&str>) -> Result<PathBuf> {
    Ok(scope_dir(root, kind, goal)?.join(kind.filename()))
}

pub fn checklist_path(root: &Path, kind: ArtifactKind, goal: Option<&str>) -> Result<PathBuf> {
    Ok(scope_dir(root, kind, goal)?
        .join(CHECKLISTS_DIR)
        .join(kind.filename()))
}

/// Path relative to the project root, with forward slashes.
pub fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(GoalkitError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

const SLUG_STOP_WORDS: &[&str] = &["a", "an", "the", "to", "of", "and", "for", "with", "in", "on"];

/// Derive a short slug from free text: the first four significant words,
/// lowercased and hyphen-joined.
pub fn slugify(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .filter(|w| !SLUG_STOP_WORDS.contains(&w.as_str()))
        .take(4)
        .collect();
    if words.is_empty() {
        "goal".to_string()
    } else {
        words.join("-")
    }
}

/// Numbered directory name for a new goal, e.g. `003-team-task-board`.
pub fn numbered_slug(number: u32, base: &str) -> String {
    format!("{number:03}-{base}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        for slug in ["001-task-app", "a", "launch-beta", "x1"] {
            validate_slug(slug).unwrap_or_else(|_| panic!("expected valid: {slug}"));
        }
    }

    #[test]
    fn invalid_slugs() {
        for slug in ["", "-dash", "dash-", "has spaces", "UPPER", "a_b"] {
            assert!(validate_slug(slug).is_err(), "expected invalid: {slug}");
        }
    }

    #[test]
    fn slugify_drops_stop_words() {
        assert_eq!(slugify("Task app for teams"), "task-app-teams");
        assert_eq!(
            slugify("Reduce onboarding time by 50% for new users"),
            "reduce-onboarding-time-by"
        );
        assert_eq!(slugify("!!!"), "goal");
        assert_eq!(numbered_slug(7, "beta"), "007-beta");
    }

    #[test]
    fn artifact_paths_follow_scope() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            artifact_path(root, ArtifactKind::Vision, None).unwrap(),
            PathBuf::from("/tmp/proj/.goalkit/vision/vision.md")
        );
        assert_eq!(
            checklist_path(root, ArtifactKind::Milestones, Some("001-beta")).unwrap(),
            PathBuf::from("/tmp/proj/.goalkit/goals/001-beta/checklists/milestones.md")
        );
        assert_eq!(
            artifact_path(root, ArtifactKind::Coordination, None).unwrap(),
            PathBuf::from("/tmp/proj/.goalkit/coordination/coordination.md")
        );
        assert!(matches!(
            artifact_path(root, ArtifactKind::Strategies, None),
            Err(GoalkitError::GoalRequired(_))
        ));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/tmp/proj");
        let path = root.join(".goalkit/goals/001-x/goal.md");
        assert_eq!(relative(root, &path), ".goalkit/goals/001-x/goal.md");
    }
}
