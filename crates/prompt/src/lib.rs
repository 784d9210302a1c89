//! Prompt system for qagen.
//!
//! This crate provides the prompts sent to the completion service:
//! - Built-in definitions for question and answer generation
//! - YAML overrides from `.qagen/prompts/<id>.yml`
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, compile_prompt};
pub use defaults::{builtin_prompt, ANSWER_PROMPT_ID, ANSWER_WITH_SOURCES_PROMPT_ID, QUESTIONS_PROMPT_ID};
pub use loader::{list_prompts, load_prompt, PromptSummary};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOrigin};
