//! Built-in prompt definitions.
//!
//! Workspaces can replace any of these with `.qagen/prompts/<id>.yml`.

use crate::types::PromptDefinition;

/// Prompt asking for a list of questions. Variables: `topic`, `count`.
pub const QUESTIONS_PROMPT_ID: &str = "qa.questions";

/// Prompt forwarding the bare question. Variables: `question`.
pub const ANSWER_PROMPT_ID: &str = "qa.answer";

/// Prompt asking for an answer with a trailing `Sources:` section.
/// Variables: `question`.
pub const ANSWER_WITH_SOURCES_PROMPT_ID: &str = "qa.answer.sources";

/// All built-in prompt ids.
pub const BUILTIN_PROMPT_IDS: [&str; 3] = [
    QUESTIONS_PROMPT_ID,
    ANSWER_PROMPT_ID,
    ANSWER_WITH_SOURCES_PROMPT_ID,
];

const QUESTIONS_TEMPLATE: &str = "Generate {{count}} diverse and interesting questions about {{topic}}. Only return the list of questions.";

const ANSWER_TEMPLATE: &str = "{{question}}";

const ANSWER_WITH_SOURCES_TEMPLATE: &str = "{{question}}

Please answer clearly and concisely.
Include 2-3 credible sources or references (with URLs if available)
under a heading 'Sources:' at the end.";

/// Look up a built-in prompt definition.
pub fn builtin_prompt(id: &str) -> Option<PromptDefinition> {
    let (title, template) = match id {
        QUESTIONS_PROMPT_ID => ("Question list", QUESTIONS_TEMPLATE),
        ANSWER_PROMPT_ID => ("Plain answer", ANSWER_TEMPLATE),
        ANSWER_WITH_SOURCES_PROMPT_ID => ("Answer with sources", ANSWER_WITH_SOURCES_TEMPLATE),
        _ => return None,
    };

    Some(PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        created_by: "qagen".to_string(),
        system: None,
        template: template.to_string(),
    })
}
