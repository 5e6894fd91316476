//! Reconstructed model: tasks, pipeline nodes, operations and statistics.
//!
//! Everything here is derived from the flat entry sequence produced by
//! [`crate::log::parse_log_text`] and is recomputed on every call.

pub mod nodes;
pub mod stats;
pub mod tasks;
pub mod time;

use crate::log::{Entry, TaskId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use nodes::build_task_nodes;
pub use stats::build_statistics;
pub use tasks::build_tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        }
    }
}

/// One top-level unit of work, opened by a `Task.Starting` record.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub task_id: TaskId,
    /// Entry-point name from the start record.
    pub entry: String,
    pub start_time: String,
    /// Timestamp of the last entry attributed to this task, in stream order.
    pub end_time: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Running,
    Success,
    Failed,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Running => "running",
            NodeStatus::Success => "success",
            NodeStatus::Failed => "failed",
        }
    }
}

/// A candidate for the next pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextListItem {
    pub name: String,
    pub anchor: bool,
    pub jump_back: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Recognition,
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Failed,
}

/// A recognition attempt or action execution inside a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub name: String,
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reco_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<i64>,
    pub details: Map<String, Value>,
}

/// Summary of a nested `recognition` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionDetail {
    pub reco_id: Option<i64>,
    pub name: String,
    pub algorithm: Option<String>,
    pub score: Option<f64>,
    #[serde(rename = "box")]
    pub bbox: Option<[i64; 4]>,
    pub text: Option<String>,
    pub raw_detail: Value,
}

/// Summary of a nested `action` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDetail {
    pub action_id: Option<i64>,
    pub name: String,
    pub action_type: Option<String>,
    pub target_box: Option<[i64; 4]>,
    pub success: Option<bool>,
    pub raw_detail: Value,
}

/// One pipeline step, bracketed by `PipelineNode.Starting` and a terminal marker.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub name: String,
    pub timestamp: String,
    pub end_time: String,
    pub status: NodeStatus,
    pub node_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub operations: Vec<Operation>,
    pub next_list: Vec<NextListItem>,
    pub recognition_details: Vec<RecognitionDetail>,
    pub action_details: Vec<ActionDetail>,
    /// Raw records from the start marker to the closing marker, inclusive.
    pub entries: Vec<Entry>,
    pub anchor: bool,
    pub jump_back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_entries: usize,
    pub sink_types: BTreeMap<String, usize>,
    pub message_types: BTreeMap<String, usize>,
    pub tasks: usize,
    pub nodes: usize,
    pub failures: usize,
    pub time_range: TimeRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    #[serde(flatten)]
    pub task: Task,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub statistics: Statistics,
    pub tasks: Vec<TaskReport>,
}

/// Build the full report: statistics plus every task with its nodes.
pub fn build_report_data(entries: &[Entry]) -> ReportData {
    let tasks = build_tasks(entries)
        .into_iter()
        .map(|task| {
            let nodes = build_task_nodes(&task);
            TaskReport { task, nodes }
        })
        .collect();

    ReportData {
        statistics: build_statistics(entries),
        tasks,
    }
}
