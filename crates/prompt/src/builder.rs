//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use qagen_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders the user template (and the system template, if any) with
/// Handlebars and returns a `BuiltPrompt` ready for LLM execution.
///
/// # Example
/// ```
/// use qagen_prompt::{build_prompt, builtin_prompt, QUESTIONS_PROMPT_ID};
/// use std::collections::HashMap;
///
/// let def = builtin_prompt(QUESTIONS_PROMPT_ID).unwrap();
/// let mut vars = HashMap::new();
/// vars.insert("topic".to_string(), "volcanoes".to_string());
/// vars.insert("count".to_string(), "3".to_string());
///
/// let built = build_prompt(&def, vars).unwrap();
/// assert!(built.user.contains("3 diverse and interesting questions about volcanoes"));
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let user = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Check that every template of a definition compiles, without rendering.
pub fn compile_prompt(definition: &PromptDefinition) -> AppResult<()> {
    registry(&definition.template)?;
    if let Some(ref system) = definition.system {
        registry(system)?;
    }
    Ok(())
}

fn registry(template: &str) -> AppResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    Ok(handlebars)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let handlebars = registry(template)?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
