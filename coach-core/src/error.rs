//! Errors for reading and aggregating the exercise result dataset.
//!
//! These are configuration/input errors: fatal, propagated unchanged, never
//! retried.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("failed to read exercise results from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed exercise result at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("exercise result at index {index} has an empty session_group")]
    MissingSessionGroup { index: usize },
}
