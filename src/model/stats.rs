use crate::log::Entry;
use crate::log::event::is_failure;
use crate::model::{Statistics, TimeRange, build_task_nodes, build_tasks};
use std::collections::BTreeMap;

/// Aggregate counts over all entries. Task and node counts rerun the full
/// reconstruction; nothing is cached between calls.
pub fn build_statistics(entries: &[Entry]) -> Statistics {
    let mut sink_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut message_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut failures = 0usize;

    for entry in entries {
        *sink_types.entry(entry.sink_type.clone()).or_default() += 1;
        *message_types.entry(entry.message.clone()).or_default() += 1;
        if is_failure(&entry.message) {
            failures += 1;
        }
    }

    let tasks = build_tasks(entries);
    let nodes = tasks.iter().map(|t| build_task_nodes(t).len()).sum::<usize>();

    // Stream order, not sorted: producers may interleave.
    let mut known = entries.iter().filter(|e| !e.has_unknown_timestamp());
    let start = known.next().map(|e| e.timestamp.clone());
    let end = known.last().map(|e| e.timestamp.clone()).or_else(|| start.clone());

    Statistics {
        total_entries: entries.len(),
        sink_types,
        message_types,
        tasks: tasks.len(),
        nodes,
        failures,
        time_range: TimeRange {
            start: start.unwrap_or_default(),
            end: end.unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::entries_from;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn counts_categories_messages_and_failures() {
        let entries = entries_from(&[
            json!({"sink_type": "info", "message": "Tasker.Task.Starting", "details": {"task_id": 1}}),
            json!({"timestamp": "t2", "sink_type": "info", "message": "Node.PipelineNode.Starting", "details": {"task_id": 1, "name": "N"}}),
            json!({"timestamp": "t3", "sink_type": {"sink_type": "file"}, "message": "Node.NextList.Failed", "details": {"task_id": 1}}),
            json!({"timestamp": "t4", "sink_type": "info", "message": "Node.PipelineNode.Failed", "details": {"task_id": 1}}),
            json!({"sink_type": "info", "message": "Tasker.Task.Failed", "details": {"task_id": 1}}),
            json!({"timestamp": "t6", "message": "SubTask.Failed"}),
        ]);

        let stats = build_statistics(&entries);

        assert_eq!(stats.total_entries, 6);
        assert_eq!(stats.failures, 4);
        assert_eq!(stats.tasks, 1);
        assert_eq!(stats.nodes, 1);
        assert_eq!(
            stats.sink_types,
            BTreeMap::from([
                ("file".to_string(), 1),
                ("info".to_string(), 4),
                ("unknown".to_string(), 1),
            ])
        );
        assert_eq!(stats.message_types.values().sum::<usize>(), stats.total_entries);
        assert_eq!(stats.message_types.get("Tasker.Task.Failed"), Some(&1));
        assert_eq!(
            stats.time_range,
            TimeRange {
                start: "t2".to_string(),
                end: "t6".to_string(),
            }
        );
    }

    #[test]
    fn time_range_uses_stream_order_and_single_timestamp() {
        let entries = entries_from(&[
            json!({"timestamp": "z", "message": "A"}),
            json!({"message": "B"}),
        ]);
        let stats = build_statistics(&entries);
        assert_eq!(stats.time_range.start, "z");
        assert_eq!(stats.time_range.end, "z");
    }

    #[test]
    fn empty_input_has_empty_range() {
        let stats = build_statistics(&[]);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.time_range.start, "");
        assert_eq!(stats.time_range.end, "");
        assert!(stats.sink_types.is_empty());
    }
}
