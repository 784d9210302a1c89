//! Run state and progress reporting.
//!
//! A run moves strictly forward:
//! `Idle -> GeneratingQuestions -> GeneratingAnswers(1..=N) -> Ready`.
//! A failed question-generation call sends it back to `Idle`.

use crate::types::QaRecord;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// State of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    GeneratingQuestions,
    /// Answering question `current` (1-based) of `total`
    GeneratingAnswers { current: usize, total: usize },
    Ready,
}

impl RunState {
    /// Short phase name used in logs.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::GeneratingQuestions => "questions",
            Self::GeneratingAnswers { .. } => "answers",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneratingAnswers { current, total } => {
                write!(f, "{} {}/{}", self.phase(), current, total)
            }
            _ => f.write_str(self.phase()),
        }
    }
}

/// Progress event emitted during a run.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub state: RunState,

    /// Human-readable message
    pub message: String,

    /// Record finished by this step, for answer events
    pub record: Option<QaRecord>,

    /// Elapsed time since the run started
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    pub fn new(state: RunState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            record: None,
            elapsed_secs: None,
        }
    }

    pub fn with_record(mut self, record: QaRecord) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        format!("[{}] {}", self.state, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new reporter with a callback.
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Create a no-op reporter (events are only logged).
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    /// Emit a progress event.
    pub fn emit(&self, event: ProgressEvent) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let event = event.with_elapsed(elapsed);

        tracing::debug!(
            state = %event.state,
            message = %event.message,
            elapsed_secs = elapsed,
            "Progress event"
        );

        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    pub fn questions_started(&self, topic: &str, count: u32) {
        self.emit(ProgressEvent::new(
            RunState::GeneratingQuestions,
            format!("requesting {} questions about {}", count, topic),
        ));
    }

    pub fn questions_failed(&self, error: &str) {
        self.emit(ProgressEvent::new(RunState::Idle, error.to_string()));
    }

    pub fn answer_started(&self, current: usize, total: usize, question: &str) {
        self.emit(ProgressEvent::new(
            RunState::GeneratingAnswers { current, total },
            format!("Q{}. {}", current, question),
        ));
    }

    pub fn answer_finished(&self, current: usize, total: usize, record: &QaRecord) {
        self.emit(
            ProgressEvent::new(
                RunState::GeneratingAnswers { current, total },
                format!("answered Q{}", current),
            )
            .with_record(record.clone()),
        );
    }

    pub fn ready(&self, rows: usize) {
        self.emit(ProgressEvent::new(
            RunState::Ready,
            format!("{} rows generated", rows),
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_event_format() {
        let event = ProgressEvent::new(
            RunState::GeneratingAnswers { current: 2, total: 5 },
            "Q2. What is magma?",
        );
        assert_eq!(event.format_simple(), "[answers 2/5] Q2. What is magma?");
    }

    #[test]
    fn test_progress_reporter_emit() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let reporter = ProgressReporter::new(Arc::new(move |event| {
            events_clone.lock().unwrap().push(event);
        }));

        reporter.questions_started("volcanoes", 3);
        reporter.ready(3);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].state, RunState::GeneratingQuestions);
        assert_eq!(captured[1].state, RunState::Ready);
        assert!(captured[1].elapsed_secs.is_some());
    }

    #[test]
    fn test_answer_finished_carries_record() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let reporter = ProgressReporter::new(Arc::new(move |event| {
            events_clone.lock().unwrap().push(event);
        }));

        let record = QaRecord {
            topic: "volcanoes".to_string(),
            question: "What is magma?".to_string(),
            answer: "Molten rock".to_string(),
            sources: None,
        };
        reporter.answer_finished(1, 3, &record);

        let captured = events.lock().unwrap();
        assert_eq!(captured[0].record.as_ref(), Some(&record));
    }

    #[test]
    fn test_noop_reporter() {
        let reporter = ProgressReporter::noop();
        reporter.ready(0); // Should not panic
    }
}
