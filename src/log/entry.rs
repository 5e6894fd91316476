use crate::log::event::EventKind;
use serde::Serialize;
use serde_json::{Map, Value};

/// Placeholder substituted for missing timestamps, messages and categories.
pub const UNKNOWN: &str = "unknown";

/// Text for a truthy value: strings pass through, other truthy values are
/// stringified. Missing, null, empty, `false` and zero give None.
pub fn truthy_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        v @ (Value::Array(_) | Value::Object(_)) => Some(v.to_string()),
        _ => None,
    }
}

/// Task identifier as carried in `details.task_id`.
pub type TaskId = i64;

/// One normalized structured log record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub timestamp: String,
    pub sink_type: String,
    pub message: String,
    pub details: Map<String, Value>,

    /// Top-level fields other than the four above, passed through untouched.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,

    /// 1-based line number in the source text.
    pub line: usize,

    #[serde(skip)]
    pub kind: EventKind,
}

impl Entry {
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.detail(key).and_then(Value::as_str)
    }

    pub fn detail_i64(&self, key: &str) -> Option<i64> {
        self.detail(key).and_then(Value::as_i64)
    }

    /// Non-zero integral task id, if any. `1.0` counts as task 1.
    pub fn task_id(&self) -> Option<TaskId> {
        let id = self.detail("task_id")?;
        id.as_i64()
            .or_else(|| {
                id.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .filter(|id| *id != 0)
    }

    /// Node or operation name: `name`, falling back to `entry`.
    pub fn node_name(&self) -> &str {
        self.detail_str("name")
            .filter(|s| !s.is_empty())
            .or_else(|| self.detail_str("entry").filter(|s| !s.is_empty()))
            .unwrap_or("")
    }

    pub fn has_unknown_timestamp(&self) -> bool {
        self.timestamp == UNKNOWN
    }
}
