//! A loaded log: the parsed entries plus the queries run against them.

use crate::error::LogError;
use crate::log::{Entry, parse_log_text};
use crate::model::{
    Node, ReportData, Statistics, Task, build_report_data, build_statistics, build_task_nodes,
    build_tasks,
};

/// Holds the entries of the last successfully parsed log so the queries below
/// never re-read raw text.
#[derive(Debug, Default)]
pub struct LogSession {
    entries: Vec<Entry>,
}

impl LogSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `content` (text or raw file bytes) and retain the entries. On
    /// failure nothing is retained.
    pub fn parse_file(&mut self, content: impl AsRef<[u8]>) -> Result<&[Entry], LogError> {
        self.entries.clear();
        self.entries = parse_log_text(content)?;
        Ok(&self.entries)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn tasks(&self) -> Vec<Task> {
        build_tasks(&self.entries)
    }

    pub fn task_nodes(&self, task: &Task) -> Vec<Node> {
        build_task_nodes(task)
    }

    pub fn statistics(&self) -> Statistics {
        build_statistics(&self.entries)
    }

    pub fn report(&self) -> ReportData {
        build_report_data(&self.entries)
    }
}
