//! Generate command handler.
//!
//! Runs the full pipeline for one topic and exports the result table.

use clap::Args;
use qagen_core::{config::AppConfig, AppResult};
use qagen_dataset::{
    to_csv_bytes, write_csv, Generator, ProgressEvent, ProgressReporter, PromptSet, QuestionCount,
    ResultTable, RunOptions, RunState, Topic,
};
use qagen_llm::{create_client, ClientOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Generate a Q&A dataset for a topic
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Topic to generate questions about
    pub topic: Option<String>,

    /// Number of questions to request (3-15)
    #[arg(
        short = 'n',
        long,
        default_value_t = QuestionCount::DEFAULT,
        value_parser = clap::value_parser!(u32).range(QuestionCount::MIN as i64..=QuestionCount::MAX as i64)
    )]
    pub count: u32,

    /// Do not ask for sources and omit the Sources column
    #[arg(long)]
    pub no_sources: bool,

    /// Directory to write the CSV file to (default: configured output dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write the CSV to stdout instead of a file
    #[arg(long, conflicts_with = "json")]
    pub stdout: bool,

    /// Print the records as JSON instead of writing a CSV file
    #[arg(long)]
    pub json: bool,

    /// Temperature for generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens per response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Do not print the running transcript
    #[arg(short, long)]
    pub quiet: bool,
}

impl GenerateCommand {
    /// Execute the generate command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing generate command");
        tracing::debug!("Generate command options: {:?}", self);

        // 1. Validate input before any network call
        let topic = match Topic::new(self.topic.as_deref().unwrap_or_default()) {
            Ok(topic) => topic,
            Err(err) => {
                tracing::warn!("Rejected blank topic");
                return Err(err);
            }
        };
        let options = RunOptions {
            count: QuestionCount::new(self.count)?,
            with_sources: !self.no_sources,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        // 2. Build the client and load prompts
        let client = create_client(&config.provider, &ClientOptions::from_config(config))?;
        let prompts = PromptSet::load(&config.workspace)?;

        let mut generator = Generator::new(client, &config.model, prompts);
        if !self.quiet {
            generator = generator.with_reporter(transcript_reporter());
        }

        // 3. Run
        let table = generator.run(&topic, &options).await?;

        if table.is_empty() {
            tracing::warn!("The model returned no questions for {:?}", topic.as_str());
        }

        // 4. Export
        self.export(&table, &topic, config)
    }

    fn export(&self, table: &ResultTable, topic: &Topic, config: &AppConfig) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(table.records())?);
            return Ok(());
        }

        if self.stdout {
            let bytes = to_csv_bytes(table)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            return Ok(());
        }

        let dir = self.output_dir.as_ref().unwrap_or(&config.output_dir);
        let path = write_csv(table, topic, dir)?;
        println!("{}", path.display());

        Ok(())
    }
}

/// Reporter that prints questions, answers and sources to stderr as they
/// arrive, keeping stdout for the dataset.
fn transcript_reporter() -> ProgressReporter {
    ProgressReporter::new(Arc::new(|event: ProgressEvent| {
        let mut stderr = std::io::stderr().lock();
        let _ = write_transcript(&mut stderr, &event);
    }))
}

fn write_transcript(out: &mut impl Write, event: &ProgressEvent) -> std::io::Result<()> {
    match (&event.state, &event.record) {
        (RunState::GeneratingQuestions, _) => writeln!(out, "Generating: {}", event.message),
        (RunState::GeneratingAnswers { .. }, None) => writeln!(out, "\n{}", event.message),
        (RunState::GeneratingAnswers { .. }, Some(record)) => {
            writeln!(out, "{}", record.answer)?;
            if let Some(ref sources) = record.sources {
                writeln!(out, "\nSources:\n{}", sources)?;
            }
            Ok(())
        }
        (RunState::Ready, _) => writeln!(out, "\nQ&A generation complete! ({})", event.message),
        (RunState::Idle, _) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use qagen_core::AppError;
    use qagen_dataset::QaRecord;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        cmd: GenerateCommand,
    }

    fn parse(args: &[&str]) -> Result<GenerateCommand, clap::Error> {
        let mut argv = vec!["qagen"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).map(|cli| cli.cmd)
    }

    #[test]
    fn test_defaults() {
        let cmd = parse(&["volcanoes"]).unwrap();
        assert_eq!(cmd.topic.as_deref(), Some("volcanoes"));
        assert_eq!(cmd.count, 5);
        assert!(!cmd.no_sources);
        assert!(!cmd.stdout);
    }

    #[test]
    fn test_count_bounds_accepted() {
        assert_eq!(parse(&["t", "--count", "3"]).unwrap().count, 3);
        assert_eq!(parse(&["t", "-n", "15"]).unwrap().count, 15);
    }

    #[test]
    fn test_count_out_of_range_rejected() {
        assert!(parse(&["t", "--count", "2"]).is_err());
        assert!(parse(&["t", "--count", "16"]).is_err());
    }

    #[test]
    fn test_stdout_conflicts_with_json() {
        assert!(parse(&["t", "--stdout", "--json"]).is_err());
    }

    #[tokio::test]
    async fn test_blank_topic_rejected_before_network() {
        let cmd = parse(&["   "]).unwrap();
        let err = cmd.execute(&AppConfig::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[tokio::test]
    async fn test_missing_topic_rejected() {
        let cmd = parse(&[]).unwrap();
        let err = cmd.execute(&AppConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("Please enter a topic"));
    }

    #[test]
    fn test_transcript_lines() {
        let record = QaRecord {
            topic: "volcanoes".to_string(),
            question: "What is magma?".to_string(),
            answer: "Molten rock.".to_string(),
            sources: Some("USGS".to_string()),
        };
        let event = ProgressEvent::new(
            RunState::GeneratingAnswers { current: 1, total: 1 },
            "answered Q1",
        )
        .with_record(record);

        let mut out = Vec::new();
        write_transcript(&mut out, &event).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Molten rock.\n\nSources:\nUSGS\n");
    }

    #[test]
    fn test_export_to_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cmd = parse(&["volcanoes", "-o", temp_dir.path().to_str().unwrap()]).unwrap();
        let topic = Topic::new("volcanoes").unwrap();

        cmd.export(&ResultTable::new(true), &topic, &AppConfig::default())
            .unwrap();

        assert!(temp_dir.path().join("volcanoes_qa_dataset.csv").exists());
    }
}
