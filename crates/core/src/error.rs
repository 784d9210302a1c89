//! Error types for the qagen CLI.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM calls, prompts, user input,
//! question generation and dataset export.

use thiserror::Error;

/// Unified error type for the qagen CLI.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing API key, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Rejected user input (blank topic, question count out of range)
    #[error("Invalid input: {0}")]
    Input(String),

    /// The question-generation call failed; the run is aborted
    #[error("Error generating questions: {0}")]
    QuestionGeneration(String),

    /// CSV export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_generation_display() {
        let err = AppError::QuestionGeneration("connection refused".to_string());
        assert_eq!(err.to_string(), "Error generating questions: connection refused");
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
