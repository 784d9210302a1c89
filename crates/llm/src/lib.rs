//! LLM integration crate for qagen.
//!
//! This crate provides a provider-agnostic abstraction over text completion
//! services. Every call is a single prompt in, a single text out.
//!
//! # Providers
//! - **OpenAI**: chat completions API (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use qagen_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = LlmRequest::new("Hello, world!", "gpt-4o-mini");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, ClientOptions};
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
