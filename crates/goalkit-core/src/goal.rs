//! Goal registry: numbered `NNN-slug` directories under `.goalkit/goals/`.

use crate::error::{GoalkitError, Result};
use crate::manifest::Manifest;
use crate::paths;
use crate::types::ArtifactKind;
use std::path::Path;

fn goals_root(root: &Path) -> std::path::PathBuf {
    root.join(paths::GOALS_DIR)
}

fn number_of(slug: &str) -> Option<u32> {
    slug.split_once('-').and_then(|(n, _)| n.parse().ok())
}

/// Slugs of every goal directory, sorted.
pub fn slugs(root: &Path) -> Result<Vec<String>> {
    let dir = goals_root(root);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut slugs = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            slugs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    slugs.sort();
    Ok(slugs)
}

pub fn next_number(root: &Path) -> Result<u32> {
    Ok(slugs(root)?
        .iter()
        .filter_map(|s| number_of(s))
        .max()
        .unwrap_or(0)
        + 1)
}

fn base_of(slug: &str) -> Option<&str> {
    slug.split_once('-').map(|(_, b)| b)
}

/// Create the next numbered goal directory and its manifest. The slug base is
/// `slug` when given, otherwise derived from `title`. A goal with the same
/// base whose goal artifact never finalized is handed back (retitled) so its
/// draft can restart; a finalized one is a [`GoalkitError::GoalExists`].
pub fn create(root: &Path, title: &str, slug: Option<&str>) -> Result<Manifest> {
    let base = match slug {
        Some(s) => {
            paths::validate_slug(s)?;
            s.to_string()
        }
        None => paths::slugify(title),
    };
    if let Some(existing) = slugs(root)?
        .into_iter()
        .find(|s| base_of(s) == Some(base.as_str()))
    {
        let dir = paths::goal_dir(root, &existing);
        let mut manifest = Manifest::load(&dir)?
            .unwrap_or_else(|| Manifest::new(title, Some(existing.clone())));
        if manifest.is_finalized(ArtifactKind::Goal) {
            return Err(GoalkitError::GoalExists(base));
        }
        manifest.title = title.to_string();
        crate::io::ensure_dir(&dir.join(paths::CHECKLISTS_DIR))?;
        manifest.save(&dir)?;
        tracing::info!(goal = %existing, "restarting unfinished goal");
        return Ok(manifest);
    }
    let full = paths::numbered_slug(next_number(root)?, &base);
    let dir = paths::goal_dir(root, &full);
    crate::io::ensure_dir(&dir.join(paths::CHECKLISTS_DIR))?;
    let mut manifest = Manifest::new(title, Some(full.clone()));
    manifest.save(&dir)?;
    tracing::info!(goal = %full, "goal created");
    Ok(manifest)
}

/// Remove a goal directory allocated by a run that failed before producing
/// anything.
pub fn discard(root: &Path, slug: &str) -> Result<()> {
    let dir = paths::goal_dir(root, slug);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
        tracing::debug!(goal = %slug, "discarded goal directory");
    }
    Ok(())
}

/// Resolve a user-supplied goal reference: the full slug, its number
/// (`1`, `001`) or its base name.
pub fn resolve(root: &Path, query: &str) -> Result<String> {
    let all = slugs(root)?;
    if all.iter().any(|s| s == query) {
        return Ok(query.to_string());
    }
    let wanted = query.parse::<u32>().ok();
    let matches: Vec<&String> = all
        .iter()
        .filter(|s| {
            (wanted.is_some() && number_of(s) == wanted)
                || base_of(s) == Some(query)
        })
        .collect();
    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        _ => Err(GoalkitError::GoalNotFound(query.to_string())),
    }
}

pub fn load(root: &Path, slug: &str) -> Result<Manifest> {
    Manifest::load(&paths::goal_dir(root, slug))?
        .ok_or_else(|| GoalkitError::GoalNotFound(slug.to_string()))
}

pub fn list(root: &Path) -> Result<Vec<Manifest>> {
    let mut goals = Vec::new();
    for slug in slugs(root)? {
        if let Some(m) = Manifest::load(&paths::goal_dir(root, &slug))? {
            goals.push(m);
        }
    }
    Ok(goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ArtifactRecord;
    use crate::types::LoopState;
    use tempfile::TempDir;

    #[test]
    fn goals_are_numbered_in_order() {
        let dir = TempDir::new().unwrap();
        let a = create(dir.path(), "Plan the week", None).unwrap();
        let b = create(dir.path(), "Share boards", Some("sharing")).unwrap();
        assert_eq!(a.slug.as_deref(), Some("001-plan-week"));
        assert_eq!(b.slug.as_deref(), Some("002-sharing"));
        assert_eq!(next_number(dir.path()).unwrap(), 3);
        assert_eq!(list(dir.path()).unwrap().len(), 2);
        assert!(dir
            .path()
            .join(".goalkit/goals/001-plan-week/checklists")
            .is_dir());
    }

    #[test]
    fn duplicate_base_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut beta = create(dir.path(), "x", Some("beta")).unwrap();
        let mut record = ArtifactRecord::new(ArtifactKind::Goal, "goal.md", "x", "x");
        record.set_state(LoopState::Ready);
        beta.upsert(record);
        beta.save(&paths::goal_dir(dir.path(), "001-beta")).unwrap();
        assert!(matches!(
            create(dir.path(), "y", Some("beta")),
            Err(GoalkitError::GoalExists(_))
        ));
        assert!(matches!(
            create(dir.path(), "z", Some("Bad Slug")),
            Err(GoalkitError::InvalidSlug(_))
        ));
    }

    #[test]
    fn unfinished_goal_is_reused() {
        let dir = TempDir::new().unwrap();
        create(dir.path(), "Plan the week", None).unwrap();
        let again = create(dir.path(), "Plan the whole week", Some("plan-week")).unwrap();
        assert_eq!(again.slug.as_deref(), Some("001-plan-week"));
        assert_eq!(again.title, "Plan the whole week");
        assert_eq!(slugs(dir.path()).unwrap(), vec!["001-plan-week"]);

        discard(dir.path(), "001-plan-week").unwrap();
        assert!(slugs(dir.path()).unwrap().is_empty());
        discard(dir.path(), "001-plan-week").unwrap();
    }

    #[test]
    fn resolve_by_slug_number_or_base() {
        let dir = TempDir::new().unwrap();
        create(dir.path(), "Plan the week", None).unwrap();
        create(dir.path(), "Share boards", Some("sharing")).unwrap();
        assert_eq!(resolve(dir.path(), "002-sharing").unwrap(), "002-sharing");
        assert_eq!(resolve(dir.path(), "1").unwrap(), "001-plan-week");
        assert_eq!(resolve(dir.path(), "002").unwrap(), "002-sharing");
        assert_eq!(resolve(dir.path(), "plan-week").unwrap(), "001-plan-week");
        assert!(matches!(
            resolve(dir.path(), "missing"),
            Err(GoalkitError::GoalNotFound(_))
        ));
        assert!(load(dir.path(), "009-x").is_err());
    }
}
