use crate::log::entry::truthy_text;
use crate::log::{Entry, EventKind, TaskId};
use crate::model::time::duration_ms;
use crate::model::{Task, TaskStatus};
use std::collections::{HashMap, HashSet};

/// Group entries into tasks.
///
/// Two passes:
/// 1) collect task ids announced by a `Task.Starting` record;
/// 2) attribute every entry carrying one of those ids to its task, wherever it
///    sits in the stream relative to the start record.
///
/// Ids never announced by a start record produce no task. Tasks are returned
/// in order of their first attributed entry.
pub fn build_tasks(entries: &[Entry]) -> Vec<Task> {
    // Pass 1: valid ids.
    let started: HashSet<TaskId> = entries
        .iter()
        .filter(|e| e.kind == EventKind::TaskStarting)
        .filter_map(Entry::task_id)
        .collect();

    // Pass 2: attribution.
    let mut tasks: Vec<Task> = Vec::new();
    let mut slots: HashMap<TaskId, usize> = HashMap::new();

    for entry in entries {
        let Some(task_id) = entry.task_id().filter(|id| started.contains(id)) else {
            continue;
        };

        let slot = *slots.entry(task_id).or_insert_with(|| {
            tasks.push(Task {
                task_id,
                entry: String::new(),
                start_time: entry.timestamp.clone(),
                end_time: entry.timestamp.clone(),
                status: TaskStatus::Running,
                duration_ms: None,
                entries: Vec::new(),
            });
            tasks.len() - 1
        });

        let task = &mut tasks[slot];
        task.entries.push(entry.clone());
        task.end_time = entry.timestamp.clone();

        match entry.kind {
            EventKind::TaskStarting => {
                task.entry = truthy_text(entry.detail("entry"))
                    .unwrap_or_else(|| "Unknown".to_string());
            }
            EventKind::TaskSucceeded => task.status = TaskStatus::Succeeded,
            EventKind::TaskFailed => task.status = TaskStatus::Failed,
            _ => {}
        }
    }

    for task in &mut tasks {
        task.duration_ms = duration_ms(&task.start_time, &task.end_time);
    }

    tasks
}
