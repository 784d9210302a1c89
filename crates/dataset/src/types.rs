//! Domain types for a generation run.

use qagen_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-chosen subject that drives question generation.
///
/// Always non-blank; surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Validate and wrap a raw topic string.
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AppError::Input(
                "Please enter a topic before generating Q&A.".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of questions to request, bounded to `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct QuestionCount(u32);

impl QuestionCount {
    pub const MIN: u32 = 3;
    pub const MAX: u32 = 15;
    pub const DEFAULT: u32 = 5;

    /// Accept a count inside the allowed range, reject anything else.
    pub fn new(count: u32) -> AppResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(AppError::Input(format!(
                "Question count must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            )))
        }
    }

    /// Clamp any count into the allowed range.
    pub fn clamped(count: u32) -> Self {
        Self(count.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generated question with its answer and optional extracted sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub topic: String,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
}

const HEADERS: &[&str] = &["Topic", "Question", "Answer"];
const HEADERS_WITH_SOURCES: &[&str] = &["Topic", "Question", "Answer", "Sources"];

/// Ordered records of one run; the unit of export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    records: Vec<QaRecord>,
    include_sources: bool,
}

impl ResultTable {
    /// Create an empty table. `include_sources` decides whether the
    /// Sources column is part of the export.
    pub fn new(include_sources: bool) -> Self {
        Self {
            records: Vec::new(),
            include_sources,
        }
    }

    pub fn push(&mut self, record: QaRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[QaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn include_sources(&self) -> bool {
        self.include_sources
    }

    /// Column headers in export order.
    pub fn headers(&self) -> &'static [&'static str] {
        if self.include_sources {
            HEADERS_WITH_SOURCES
        } else {
            HEADERS
        }
    }

    pub fn into_records(self) -> Vec<QaRecord> {
        self.records
    }
}

/// Per-run settings besides the topic.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub count: QuestionCount,

    /// Ask for citations and extract a Sources column
    pub with_sources: bool,

    pub temperature: Option<f32>,

    pub max_tokens: Option<u32>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            count: QuestionCount::default(),
            with_sources: true,
            temperature: None,
            max_tokens: None,
        }
    }
}
