use crate::output::print_json;
use anyhow::Context;
use goalkit_core::workflow;
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    let created = workflow::init_project(root, &project_name)
        .with_context(|| format!("failed to initialize {}", root.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "project": project_name,
            "created": created,
        }));
    }

    println!("Initializing goalkit in: {}", root.display());
    if created.is_empty() {
        println!("  already initialized");
    }
    for path in &created {
        println!("  created: {path}");
    }
    println!("\nNext: /goalkit.vision");
    Ok(())
}
