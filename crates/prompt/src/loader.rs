//! Prompt loader: workspace YAML overrides with built-in fallbacks.

use crate::builder::compile_prompt;
use crate::defaults::{builtin_prompt, BUILTIN_PROMPT_IDS};
use crate::types::{PromptDefinition, PromptOrigin};
use qagen_core::{AppError, AppResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Entry returned by [`list_prompts`].
#[derive(Debug, Clone, Serialize)]
pub struct PromptSummary {
    pub id: String,
    pub title: String,
    pub origin: PromptOrigin,
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".qagen/prompts")
}

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `.qagen/prompts/` takes precedence over the
/// built-in definition with the same id.
///
/// # Example
/// ```no_run
/// use qagen_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (prompt, origin) = load_prompt(Path::new("."), "qa.questions")?;
/// println!("Loaded prompt: {} ({:?})", prompt.title, origin);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(
    workspace_path: &Path,
    prompt_id: &str,
) -> AppResult<(PromptDefinition, PromptOrigin)> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        tracing::debug!("No override at {:?}, using built-in prompt", prompt_file);
        return builtin_prompt(prompt_id)
            .map(|def| (def, PromptOrigin::Builtin))
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)));
    }

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}', expected '{}'",
            prompt_file, definition.id, prompt_id
        )));
    }

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok((definition, PromptOrigin::Workspace(prompt_file)))
}

/// List built-in prompts merged with workspace overrides.
///
/// Overrides replace the built-in entry with the same id; extra workspace
/// prompts are listed after the built-ins in file-name order.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<PromptSummary>> {
    let mut summaries = Vec::new();

    for id in BUILTIN_PROMPT_IDS {
        let (def, origin) = load_prompt(workspace_path, id)?;
        summaries.push(PromptSummary {
            id: def.id,
            title: def.title,
            origin,
        });
    }

    let dir = prompts_dir(workspace_path);
    if !dir.exists() {
        return Ok(summaries);
    }

    let mut extra_ids = Vec::new();
    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !BUILTIN_PROMPT_IDS.contains(&stem) {
                    extra_ids.push(stem.to_string());
                }
            }
        }
    }

    for id in extra_ids {
        let (def, origin) = load_prompt(workspace_path, &id)?;
        summaries.push(PromptSummary {
            id: def.id,
            title: def.title,
            origin,
        });
    }

    Ok(summaries)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    let mut parts = def.api_version.split('.');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None)
            if !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );
    if !well_formed {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: '{}'. Expected format: 'x.y'",
            def.api_version
        )));
    }

    compile_prompt(def)
}
