//! Command handlers for the qagen CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod generate;
pub mod prompts;

// Re-export command types for convenience
pub use generate::GenerateCommand;
pub use prompts::PromptsCommand;
