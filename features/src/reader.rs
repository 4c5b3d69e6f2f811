//! Exercise result dataset reader.
//!
//! The dataset is a JSON Lines file, one [`ExerciseResultRow`] per line, read
//! wholesale. A missing or malformed file is a configuration error for the
//! caller; nothing here retries.

use std::fs;
use std::path::Path;

use coach_core::{AggregateError, ExerciseResultRow};
use tracing::info;

/// Reads every row of the dataset at `path`.
///
/// Blank lines are skipped; any unparsable line fails the whole read with its
/// 1-based line number.
pub fn read_exercise_results(path: &Path) -> Result<Vec<ExerciseResultRow>, AggregateError> {
    let contents = fs::read_to_string(path).map_err(|source| AggregateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: ExerciseResultRow =
            serde_json::from_str(line).map_err(|source| AggregateError::Parse {
                line: number + 1,
                source,
            })?;
        rows.push(row);
    }

    info!(path = %path.display(), rows = rows.len(), "read exercise results");

    Ok(rows)
}
