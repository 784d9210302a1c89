//! The generation pipeline: topic -> questions -> answers -> table.
//!
//! Calls are issued strictly one after another. Only a failure of the
//! question-generation call aborts a run; a failed answer is recorded in
//! place of the answer text and the run continues.

use crate::progress::ProgressReporter;
use crate::questions::parse_questions;
use crate::sources::extract_sources;
use crate::types::{QaRecord, QuestionCount, ResultTable, RunOptions, Topic};
use qagen_core::{AppError, AppResult};
use qagen_llm::{LlmClient, LlmRequest, LlmUsage};
use qagen_prompt::{
    build_prompt, builtin_prompt, compile_prompt, load_prompt, PromptDefinition, ANSWER_PROMPT_ID,
    ANSWER_WITH_SOURCES_PROMPT_ID, QUESTIONS_PROMPT_ID,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Answer text recorded when an answer call fails.
pub fn answer_error_text(err: &AppError) -> String {
    format!("Error generating answer: {}", call_error_message(err))
}

/// Description of a failed completion call, without the error category.
fn call_error_message(err: &AppError) -> String {
    match err {
        AppError::Llm(message) => message.clone(),
        other => other.to_string(),
    }
}

/// The three prompt definitions a run needs.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub questions: PromptDefinition,
    pub answer: PromptDefinition,
    pub answer_with_sources: PromptDefinition,
}

impl PromptSet {
    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        let get = |id: &str| {
            builtin_prompt(id)
                .ok_or_else(|| AppError::Prompt(format!("Missing built-in prompt: {}", id)))
        };
        Self {
            questions: get(QUESTIONS_PROMPT_ID)?,
            answer: get(ANSWER_PROMPT_ID)?,
            answer_with_sources: get(ANSWER_WITH_SOURCES_PROMPT_ID)?,
        }
        .compiled()
    }

    /// Built-in prompts with workspace overrides applied.
    ///
    /// All three templates are compiled here, so a broken override fails
    /// before any completion call is made.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        Self {
            questions: load_prompt(workspace, QUESTIONS_PROMPT_ID)?.0,
            answer: load_prompt(workspace, ANSWER_PROMPT_ID)?.0,
            answer_with_sources: load_prompt(workspace, ANSWER_WITH_SOURCES_PROMPT_ID)?.0,
        }
        .compiled()
    }

    fn compiled(self) -> AppResult<Self> {
        compile_prompt(&self.questions)?;
        compile_prompt(&self.answer)?;
        compile_prompt(&self.answer_with_sources)?;
        Ok(self)
    }

    fn answer_prompt(&self, with_sources: bool) -> &PromptDefinition {
        if with_sources {
            &self.answer_with_sources
        } else {
            &self.answer
        }
    }
}

/// Runs the pipeline against one completion client.
///
/// The client and model are passed in explicitly; nothing is shared
/// between generators.
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompts: PromptSet,
    reporter: ProgressReporter,
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompts: PromptSet) -> Self {
        Self {
            client,
            model: model.into(),
            prompts,
            reporter: ProgressReporter::noop(),
        }
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run the whole pipeline for one topic.
    ///
    /// On success the table has exactly one record per parsed question.
    /// Fails with `AppError::QuestionGeneration` if the first call fails.
    pub async fn run(&self, topic: &Topic, options: &RunOptions) -> AppResult<ResultTable> {
        tracing::info!(
            "Starting run: topic={:?} count={} sources={} provider={} model={}",
            topic.as_str(),
            options.count,
            options.with_sources,
            self.client.provider_name(),
            self.model
        );

        let mut usage = LlmUsage::default();

        let questions = match self.generate_questions(topic, options, &mut usage).await {
            Ok(questions) => questions,
            Err(err) => {
                self.reporter.questions_failed(&err.to_string());
                return Err(err);
            }
        };

        let total = questions.len();
        if total != options.count.get() as usize {
            tracing::warn!(
                "Requested {} questions, model returned {}",
                options.count,
                total
            );
        }

        let mut table = ResultTable::new(options.with_sources);

        for (i, question) in questions.into_iter().enumerate() {
            let current = i + 1;
            self.reporter.answer_started(current, total, &question);

            let (answer, sources) = self.generate_answer(&question, options, &mut usage).await?;

            let record = QaRecord {
                topic: topic.as_str().to_string(),
                question,
                answer,
                sources,
            };
            self.reporter.answer_finished(current, total, &record);
            table.push(record);
        }

        tracing::info!(
            "Run complete: {} rows, {} total tokens",
            table.len(),
            usage.total_tokens
        );
        self.reporter.ready(table.len());

        Ok(table)
    }

    /// Ask for questions about a topic and split the response.
    pub async fn generate_questions(
        &self,
        topic: &Topic,
        options: &RunOptions,
        usage: &mut LlmUsage,
    ) -> AppResult<Vec<String>> {
        self.reporter
            .questions_started(topic.as_str(), options.count.get());

        let prompt = self.render_questions_prompt(topic, options.count)?;
        let response = self
            .complete(prompt, options)
            .await
            .map_err(|e| AppError::QuestionGeneration(call_error_message(&e)))?;
        usage.add(&response.usage);

        let questions = parse_questions(response.content.trim());
        tracing::debug!("Parsed {} questions", questions.len());

        Ok(questions)
    }

    /// Answer one question.
    ///
    /// A failed call is folded into the answer text. Only prompt rendering
    /// errors are returned as `Err`; templates are compiled when the
    /// `PromptSet` is built.
    pub async fn generate_answer(
        &self,
        question: &str,
        options: &RunOptions,
        usage: &mut LlmUsage,
    ) -> AppResult<(String, Option<String>)> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        let prompt = build_prompt(self.prompts.answer_prompt(options.with_sources), variables)?;

        let answer = match self.complete(prompt, options).await {
            Ok(response) => {
                usage.add(&response.usage);
                response.content.trim().to_string()
            }
            Err(err) => {
                tracing::warn!("Answer generation failed for {:?}: {}", question, err);
                answer_error_text(&err)
            }
        };

        let sources = if options.with_sources {
            extract_sources(&answer)
        } else {
            None
        };

        Ok((answer, sources))
    }

    fn render_questions_prompt(
        &self,
        topic: &Topic,
        count: QuestionCount,
    ) -> AppResult<qagen_prompt::BuiltPrompt> {
        let mut variables = HashMap::new();
        variables.insert("topic".to_string(), topic.as_str().to_string());
        variables.insert("count".to_string(), count.to_string());
        build_prompt(&self.prompts.questions, variables)
    }

    async fn complete(
        &self,
        prompt: qagen_prompt::BuiltPrompt,
        options: &RunOptions,
    ) -> AppResult<qagen_llm::LlmResponse> {
        let mut request = LlmRequest::new(prompt.user, &self.model);

        if let Some(system) = prompt.system {
            request = request.with_system(system);
        }
        if let Some(temperature) = options.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        self.client.complete(&request).await
    }
}
