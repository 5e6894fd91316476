use std::io;

use thiserror::Error;

/// Errors surfaced while loading a structured log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The first record could not be decoded: the input is not a JSONL log.
    #[error(
        "line {line} is not a structured log record ({reason}); this file is not a structured (JSONL) log, switch to plain-text search mode"
    )]
    NotStructured { line: usize, reason: String },
    #[error("log file {path} is empty")]
    Empty { path: String },
    #[error("cannot read log file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },
}
