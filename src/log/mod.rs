//! Line ingestion for JSONL pipeline logs.

pub mod entry;
pub mod event;
pub mod parse;

pub use entry::{Entry, TaskId, UNKNOWN};
pub use event::EventKind;
pub use parse::{parse_log_text, read_log_file};

/// Parse in-memory JSON records as if they were lines of a log file.
#[cfg(test)]
pub(crate) fn entries_from(records: &[serde_json::Value]) -> Vec<Entry> {
    let text: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    parse_log_text(&text.join("\n")).expect("fixture records decode")
}
