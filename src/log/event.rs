//! Event classification for dotted message names.
//!
//! Messages look like `Node.PipelineNode.Starting`. Matching is by substring,
//! so `Tasker.Task.Starting` and `Foo.Task.Starting` classify the same way.
//! Patterns are tested in table order and the first hit wins.

/// Structural role of a log record, derived once from its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    TaskStarting,
    TaskSucceeded,
    TaskFailed,
    NodeStarting,
    NodeSucceeded,
    NodeFailed,
    RecognitionSucceeded,
    RecognitionFailed,
    ActionSucceeded,
    ActionFailed,
    NextListStarting,
    NextListFailed,
    Other,
}

const PATTERNS: &[(&str, EventKind)] = &[
    ("Task.Starting", EventKind::TaskStarting),
    ("Task.Succeeded", EventKind::TaskSucceeded),
    ("Task.Failed", EventKind::TaskFailed),
    ("PipelineNode.Starting", EventKind::NodeStarting),
    ("PipelineNode.Succeeded", EventKind::NodeSucceeded),
    ("PipelineNode.Failed", EventKind::NodeFailed),
    ("Recognition.Succeeded", EventKind::RecognitionSucceeded),
    ("Recognition.Failed", EventKind::RecognitionFailed),
    ("Action.Succeeded", EventKind::ActionSucceeded),
    ("Action.Failed", EventKind::ActionFailed),
    ("NextList.Starting", EventKind::NextListStarting),
    ("NextList.Failed", EventKind::NextListFailed),
];

impl EventKind {
    pub fn classify(message: &str) -> Self {
        PATTERNS
            .iter()
            .find(|(pattern, _)| message.contains(pattern))
            .map(|(_, kind)| *kind)
            .unwrap_or(EventKind::Other)
    }

    /// True for the markers that carry an embedded candidate list.
    pub fn carries_next_list(self) -> bool {
        matches!(self, EventKind::NextListStarting | EventKind::NextListFailed)
    }
}

/// Task-level messages are never attributed to a pipeline node.
pub fn is_task_scope(message: &str) -> bool {
    message.contains("Tasker.")
}

/// Loose failure rule used by the statistics counter.
pub fn is_failure(message: &str) -> bool {
    message.contains("Failed")
}
