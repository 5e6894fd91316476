use crate::error::LogError;
use crate::log::entry::truthy_text;
use crate::log::{Entry, EventKind, UNKNOWN};
use serde_json::{Map, Value};
use std::fs;
use tracing::{error, warn};

/// Read a log file as raw bytes, rejecting unreadable and blank files.
///
/// Encoding is checked per line during parsing, so one corrupt byte only
/// costs the line it sits on.
pub fn read_log_file(path: &str) -> Result<Vec<u8>, LogError> {
    let bytes = fs::read(path).map_err(|source| LogError::Unreadable {
        path: path.to_string(),
        source,
    })?;

    if bytes.trim_ascii().is_empty() {
        return Err(LogError::Empty {
            path: path.to_string(),
        });
    }

    Ok(bytes)
}

/// Parse JSONL content into normalized entries, in line order.
///
/// Each non-blank line must hold one JSON object, e.g.
/// {"timestamp":"2025-01-08 15:21:09.123","sink_type":"info","message":"Node.PipelineNode.Starting","details":{...}}
///
/// The first non-blank line decides whether this is a structured log at all:
/// if it fails to decode (bad JSON or bad UTF-8) the whole parse fails. Later
/// failures only drop the offending line.
pub fn parse_log_text(content: impl AsRef<[u8]>) -> Result<Vec<Entry>, LogError> {
    let mut out = Vec::new();
    let mut seen_record = false;

    for (lineno, line) in content.as_ref().split(|b| *b == b'\n').enumerate() {
        let lno = lineno + 1;
        let line = line.trim_ascii();

        if line.is_empty() {
            continue;
        }

        let is_first = !seen_record;
        seen_record = true;

        match decode_line(line) {
            Ok(fields) => out.push(normalize(fields, lno)),
            Err(reason) if is_first => {
                error!(line = lno, "first log line failed to decode: {}", reason);
                return Err(LogError::NotStructured { line: lno, reason });
            }
            Err(reason) => {
                warn!(line = lno, "skipping undecodable log line: {}", reason);
            }
        }
    }

    Ok(out)
}

fn decode_line(line: &[u8]) -> Result<Map<String, Value>, String> {
    let line = std::str::from_utf8(line).map_err(|e| format!("invalid UTF-8: {}", e))?;
    match serde_json::from_str::<Value>(line).map_err(|e| e.to_string())? {
        Value::Object(fields) => Ok(fields),
        other => Err(format!("expected a JSON object, found {}", value_kind(&other))),
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn normalize(mut fields: Map<String, Value>, line: usize) -> Entry {
    // Some producers nest the category: "sink_type": {"sink_type": "info", ...}.
    let sink_type = match fields.remove("sink_type") {
        Some(Value::Object(inner)) => text_or_unknown(inner.get("sink_type")),
        other => text_or_unknown(other.as_ref()),
    };
    let timestamp = text_or_unknown(fields.remove("timestamp").as_ref());
    let message = text_or_unknown(fields.remove("message").as_ref());
    let details = match fields.remove("details") {
        Some(Value::Object(details)) => details,
        _ => Map::new(),
    };
    let kind = EventKind::classify(&message);

    Entry {
        timestamp,
        sink_type,
        message,
        details,
        extra: fields,
        line,
        kind,
    }
}

fn text_or_unknown(v: Option<&Value>) -> String {
    truthy_text(v).unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn line(v: Value) -> String {
        v.to_string()
    }

    #[test]
    fn first_line_failure_is_fatal() {
        let text = format!(
            "not json\n{}\n",
            line(json!({"timestamp": "t1", "sink_type": "info", "message": "A.B", "details": {}}))
        );
        let err = parse_log_text(&text).unwrap_err();
        match err {
            LogError::NotStructured { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fatal_rule_applies_to_first_non_blank_line() {
        let text = "\n   \n[1, 2]\n";
        let err = parse_log_text(text).unwrap_err();
        assert!(matches!(err, LogError::NotStructured { line: 3, .. }));
        assert!(err.to_string().contains("plain-text search"));
    }

    #[test]
    fn later_bad_lines_are_skipped() {
        let text = [
            line(json!({"timestamp": "t1", "message": "A.One"})),
            "{broken".to_string(),
            String::new(),
            line(json!({"timestamp": "t3", "message": "A.Two"})),
            "42".to_string(),
        ]
        .join("\n");

        let entries = parse_log_text(&text).unwrap();
        let got: Vec<(usize, &str)> = entries
            .iter()
            .map(|e| (e.line, e.message.as_str()))
            .collect();
        assert_eq!(got, vec![(1, "A.One"), (4, "A.Two")]);
    }

    #[test]
    fn missing_fields_get_sentinels() {
        let entries = parse_log_text("{}").unwrap();
        let e = &entries[0];
        assert_eq!(e.timestamp, UNKNOWN);
        assert_eq!(e.message, UNKNOWN);
        assert_eq!(e.sink_type, UNKNOWN);
        assert!(e.details.is_empty());
        assert_eq!(e.kind, EventKind::Other);
    }

    #[test]
    fn nested_sink_type_is_flattened() {
        let text = [
            line(json!({"sink_type": {"sink_type": "file", "level": 2}, "message": "A"})),
            line(json!({"sink_type": {"level": 2}, "message": "B"})),
        ]
        .join("\n");
        let entries = parse_log_text(&text).unwrap();
        assert_eq!(entries[0].sink_type, "file");
        assert_eq!(entries[1].sink_type, UNKNOWN);
    }

    #[test]
    fn falsy_and_non_object_fields_are_replaced() {
        let text = line(json!({
            "timestamp": "",
            "message": 0,
            "details": "oops",
            "process": 77,
        }));
        let e = &parse_log_text(&text).unwrap()[0];
        assert_eq!(e.timestamp, UNKNOWN);
        assert_eq!(e.message, UNKNOWN);
        assert!(e.details.is_empty());
        assert_eq!(e.extra.get("process"), Some(&json!(77)));
    }

    #[test]
    fn classifies_message_on_ingest() {
        let text = line(json!({"message": "Tasker.Task.Starting", "details": {"task_id": 3}}));
        let e = &parse_log_text(&text).unwrap()[0];
        assert_eq!(e.kind, EventKind::TaskStarting);
        assert_eq!(e.task_id(), Some(3));
    }

    #[test]
    fn empty_text_yields_no_entries() {
        assert_eq!(parse_log_text("").unwrap(), Vec::<Entry>::new());
        assert_eq!(parse_log_text("\n\n  \n").unwrap(), Vec::<Entry>::new());
    }

    #[test]
    fn read_log_file_distinguishes_empty_and_unreadable() {
        let dir = tempfile::tempdir().unwrap();

        let empty = dir.path().join("empty.jsonl");
        fs::write(&empty, "\n \n").unwrap();
        let err = read_log_file(empty.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, LogError::Empty { .. }));

        let missing = dir.path().join("missing.jsonl");
        let err = read_log_file(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, LogError::Unreadable { .. }));
    }

    #[test]
    fn invalid_utf8_only_drops_its_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.jsonl");
        let mut bytes = br#"{"timestamp":"t1","message":"A.One"}"#.to_vec();
        bytes.extend_from_slice(b"\n{\"message\":\"bad \xff byte\"}\n");
        bytes.extend_from_slice(br#"{"timestamp":"t3","message":"A.Two"}"#);
        fs::write(&path, &bytes).unwrap();

        let raw = read_log_file(path.to_str().unwrap()).unwrap();
        let entries = parse_log_text(&raw).unwrap();
        let got: Vec<(usize, &str)> = entries
            .iter()
            .map(|e| (e.line, e.message.as_str()))
            .collect();
        assert_eq!(got, vec![(1, "A.One"), (3, "A.Two")]);
    }

    #[test]
    fn invalid_utf8_on_first_line_is_fatal() {
        let bytes = b"\xff\xfe{}\n{\"message\":\"A\"}\n";
        let err = parse_log_text(bytes).unwrap_err();
        assert!(matches!(err, LogError::NotStructured { line: 1, .. }));
        assert!(err.to_string().contains("UTF-8"));
    }
}
