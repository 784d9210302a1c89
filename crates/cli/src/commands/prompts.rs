//! Prompts command handler.
//!
//! Lists the prompt definitions a run would use.

use clap::Args;
use qagen_core::{config::AppConfig, AppResult};
use qagen_prompt::{list_prompts, PromptOrigin};

/// List prompt definitions (built-in and workspace overrides)
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        let prompts = list_prompts(&config.workspace)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&prompts)?);
            return Ok(());
        }

        for prompt in prompts {
            let origin = match prompt.origin {
                PromptOrigin::Builtin => "built-in".to_string(),
                PromptOrigin::Workspace(path) => path.display().to_string(),
            };
            println!("{:<20} {:<22} {}", prompt.id, prompt.title, origin);
        }

        Ok(())
    }
}
