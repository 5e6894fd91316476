//! Pipeline node reconstruction within one task.

use crate::log::event::is_task_scope;
use crate::log::{Entry, EventKind};
use crate::model::time::duration_ms;
use crate::model::{
    ActionDetail, NextListItem, Node, NodeStatus, Operation, OperationKind, OperationStatus,
    RecognitionDetail, Task,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Maximum number of candidates kept on a node's next list.
pub const NEXT_LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct NodeFlags {
    anchor: bool,
    jump_back: bool,
}

/// Rebuild the closed pipeline nodes of a task, in discovery order.
///
/// Pass 1 harvests anchor/jump-back flags from every candidate list in the
/// task (first mention of a name wins). Pass 2 walks the entries with a single
/// open-node slot: a new start record replaces an unclosed node, and a node
/// still open at the end of the task is dropped.
pub fn build_task_nodes(task: &Task) -> Vec<Node> {
    let flags = harvest_flags(&task.entries);

    let mut nodes = Vec::new();
    let mut current: Option<Node> = None;

    for entry in &task.entries {
        if is_task_scope(&entry.message) {
            continue;
        }

        match entry.kind {
            EventKind::NodeStarting => {
                if let Some(prev) = current.take() {
                    debug!(node = %prev.name, line = entry.line, "unclosed node replaced by a new start");
                }
                let name = entry.node_name();
                let f = flags.get(name).copied().unwrap_or_default();
                if f.anchor || f.jump_back {
                    debug!(node = name, anchor = f.anchor, jump_back = f.jump_back, "created flagged node");
                }
                current = Some(Node::open(entry, f));
                continue;
            }
            EventKind::NodeSucceeded | EventKind::NodeFailed => {
                if let Some(mut node) = current.take() {
                    let status = if entry.kind == EventKind::NodeSucceeded {
                        NodeStatus::Success
                    } else {
                        NodeStatus::Failed
                    };
                    node.close(entry, status);
                    nodes.push(node);
                }
                continue;
            }
            _ => {}
        }

        let Some(node) = current.as_mut() else {
            continue;
        };
        node.entries.push(entry.clone());

        match entry.kind {
            EventKind::RecognitionSucceeded => node.record_recognition(entry, OperationStatus::Success),
            EventKind::RecognitionFailed => node.record_recognition(entry, OperationStatus::Failed),
            EventKind::ActionSucceeded => node.record_action(entry, OperationStatus::Success),
            EventKind::ActionFailed => node.record_action(entry, OperationStatus::Failed),
            EventKind::NextListStarting => {
                node.next_list = next_list_items(entry)
                    .map(|item| {
                        let f = item_flags(item);
                        NextListItem {
                            name: item_name(item).unwrap_or("").to_string(),
                            anchor: f.anchor,
                            jump_back: f.jump_back,
                        }
                    })
                    .take(NEXT_LIST_LIMIT)
                    .collect();
            }
            _ => {}
        }
    }

    if let Some(node) = current {
        debug!(task = task.task_id, node = %node.name, "node never closed; dropped");
    }

    nodes
}

fn harvest_flags(entries: &[Entry]) -> HashMap<String, NodeFlags> {
    let mut flags: HashMap<String, NodeFlags> = HashMap::new();
    for entry in entries.iter().filter(|e| e.kind.carries_next_list()) {
        for item in next_list_items(entry) {
            let Some(name) = item_name(item).filter(|n| !n.is_empty()) else {
                continue;
            };
            flags
                .entry(name.to_string())
                .or_insert_with(|| item_flags(item));
        }
    }

    let flagged: Vec<&String> = flags
        .iter()
        .filter(|(_, f)| f.anchor || f.jump_back)
        .map(|(name, _)| name)
        .collect();
    if !flagged.is_empty() {
        debug!(?flagged, "harvested flagged next-list names");
    }

    flags
}

fn next_list_items(entry: &Entry) -> impl Iterator<Item = &Value> {
    entry
        .detail("list")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn item_name(item: &Value) -> Option<&str> {
    item.get("name").and_then(Value::as_str)
}

fn item_flags(item: &Value) -> NodeFlags {
    let flag = |key: &str| item.get(key).and_then(Value::as_bool).unwrap_or(false);
    NodeFlags {
        anchor: flag("anchor"),
        jump_back: flag("jump_back"),
    }
}

fn parse_box(v: Option<&Value>) -> Option<[i64; 4]> {
    serde_json::from_value(v?.clone()).ok()
}

impl Node {
    fn open(entry: &Entry, flags: NodeFlags) -> Self {
        Node {
            name: entry.node_name().to_string(),
            timestamp: entry.timestamp.clone(),
            end_time: String::new(),
            status: NodeStatus::Running,
            node_id: entry.detail_i64("node_id"),
            duration_ms: None,
            operations: Vec::new(),
            next_list: Vec::new(),
            recognition_details: Vec::new(),
            action_details: Vec::new(),
            entries: vec![entry.clone()],
            anchor: flags.anchor,
            jump_back: flags.jump_back,
        }
    }

    fn close(&mut self, entry: &Entry, status: NodeStatus) {
        self.status = status;
        self.end_time = entry.timestamp.clone();
        self.duration_ms = duration_ms(&self.timestamp, &self.end_time);
        self.entries.push(entry.clone());
    }

    fn record_recognition(&mut self, entry: &Entry, status: OperationStatus) {
        let name = entry.node_name().to_string();
        let reco_id = entry.detail_i64("reco_id");

        if let Some(payload) = entry.detail("recognition").filter(|v| v.is_object()) {
            let best = payload.get("best_result");
            self.recognition_details.push(RecognitionDetail {
                reco_id,
                name: name.clone(),
                algorithm: payload
                    .get("algorithm")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                score: best.and_then(|b| b.get("score")).and_then(Value::as_f64),
                bbox: parse_box(payload.get("box")),
                text: best
                    .and_then(|b| b.get("text"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                raw_detail: payload.clone(),
            });
        }

        self.operations.push(Operation {
            kind: OperationKind::Recognition,
            name,
            status,
            reco_id,
            action_id: None,
            details: entry.details.clone(),
        });
    }

    fn record_action(&mut self, entry: &Entry, status: OperationStatus) {
        let name = entry.node_name().to_string();
        let action_id = entry.detail_i64("action_id");

        if let Some(payload) = entry.detail("action").filter(|v| v.is_object()) {
            self.action_details.push(ActionDetail {
                action_id,
                name: name.clone(),
                action_type: payload
                    .get("action_type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                target_box: parse_box(payload.get("box")),
                success: payload.get("success").and_then(Value::as_bool),
                raw_detail: payload.clone(),
            });
        }

        self.operations.push(Operation {
            kind: OperationKind::Action,
            name,
            status,
            reco_id: None,
            action_id,
            details: entry.details.clone(),
        });
    }
}
