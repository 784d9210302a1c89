//! Q&A dataset generation.
//!
//! Turns a topic into a table of generated questions and answers:
//! 1. ask the completion service for a list of questions,
//! 2. ask it to answer each question in turn (optionally with sources),
//! 3. export the resulting table as CSV.

pub mod export;
pub mod pipeline;
pub mod progress;
pub mod questions;
pub mod sources;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use export::{dataset_file_name, from_csv_bytes, to_csv_bytes, write_csv};
pub use pipeline::{answer_error_text, Generator, PromptSet};
pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter, RunState};
pub use questions::parse_questions;
pub use sources::extract_sources;
pub use types::{QaRecord, QuestionCount, ResultTable, RunOptions, Topic};
