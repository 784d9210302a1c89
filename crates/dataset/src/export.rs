//! CSV export of a result table.

use crate::types::{QaRecord, ResultTable, Topic};
use qagen_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

const FILE_SUFFIX: &str = "_qa_dataset.csv";

/// Serialize a table to UTF-8 CSV.
///
/// Header row is `Topic,Question,Answer` plus `Sources` when the table
/// carries sources. Fields containing commas, quotes or newlines are quoted.
pub fn to_csv_bytes(table: &ResultTable) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.headers()).map_err(csv_error)?;

    for record in table.records() {
        let mut row = vec![
            record.topic.as_str(),
            record.question.as_str(),
            record.answer.as_str(),
        ];
        if table.include_sources() {
            row.push(record.sources.as_deref().unwrap_or(""));
        }
        writer.write_record(&row).map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Export(format!("Failed to flush CSV: {}", e)))
}

/// Parse a dataset produced by [`to_csv_bytes`].
///
/// Empty Sources fields come back as `None`.
pub fn from_csv_bytes(bytes: &[u8]) -> AppResult<ResultTable> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns: Vec<&str> = headers.iter().collect();
    let include_sources = match columns.as_slice() {
        ["Topic", "Question", "Answer"] => false,
        ["Topic", "Question", "Answer", "Sources"] => true,
        other => {
            return Err(AppError::Export(format!(
                "Unexpected CSV header: {}",
                other.join(",")
            )))
        }
    };

    let mut table = ResultTable::new(include_sources);
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let field = |i: usize| row.get(i).unwrap_or_default().to_string();
        let sources = if include_sources {
            Some(field(3)).filter(|s| !s.is_empty())
        } else {
            None
        };
        table.push(QaRecord {
            topic: field(0),
            question: field(1),
            answer: field(2),
            sources,
        });
    }

    Ok(table)
}

/// File name for a topic's dataset.
///
/// Lower-cased, spaces and path separators replaced with `_`, suffixed
/// `_qa_dataset.csv`.
pub fn dataset_file_name(topic: &Topic) -> String {
    let stem: String = topic
        .as_str()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{}{}", stem, FILE_SUFFIX)
}

/// Write the table to `<dir>/<dataset_file_name(topic)>` and return the path.
///
/// The directory is created if needed; an existing file is overwritten.
pub fn write_csv(table: &ResultTable, topic: &Topic, dir: &Path) -> AppResult<PathBuf> {
    let bytes = to_csv_bytes(table)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(dataset_file_name(topic));
    std::fs::write(&path, bytes)?;

    tracing::info!("Wrote {} rows to {:?}", table.len(), path);
    Ok(path)
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::Export(err.to_string())
}
