//! JSONL transcript writer.
//!
//! Every [`ConversationEvent`] becomes one JSON line carrying `type`,
//! `timestamp` (RFC 3339, milliseconds, UTC) and the payload fields. The
//! file is opened in append mode so transcripts from successive runs
//! accumulate.

use chrono::SecondsFormat;
use cloudgenie_application::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path`, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: ConversationEvent) -> Value {
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert(
            "timestamp".to_string(),
            Value::String(event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Value::Object(map)
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let line = match serde_json::to_string(&Self::record(event)) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not serialize transcript event: {}", e);
                return;
            }
        };

        if let Ok(mut writer) = self.writer.lock() {
            let result = writeln!(writer, "{}", line).and_then(|_| writer.flush());
            if let Err(e) = result {
                warn!("Could not write transcript {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            "model_response",
            json!({"iteration": 1, "text": "", "tool_calls": 1}),
        ));
        logger.log(ConversationEvent::new(
            "tool_call",
            json!({"tool": "list_blueprints", "arguments": {}}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "model_response");
        assert_eq!(lines[0]["iteration"], 1);
        assert_eq!(lines[1]["type"], "tool_call");
        assert_eq!(lines[1]["tool"], "list_blueprints");
        assert!(lines.iter().all(|l| l["timestamp"].is_string()));
    }

    #[test]
    fn uses_event_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        let mut event = ConversationEvent::new("tool_result", json!({"cached": true}));
        event.timestamp = Utc.with_ymd_and_hms(2024, 11, 5, 12, 30, 0).unwrap();
        logger.log(event);
        drop(logger);

        assert_eq!(read_lines(&path)[0]["timestamp"], "2024-11-05T12:30:00.000Z");
    }

    #[test]
    fn non_object_payload_goes_under_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();
        logger.log(ConversationEvent::new("note", json!("just a string")));
        drop(logger);

        let line = &read_lines(&path)[0];
        assert_eq!(line["type"], "note");
        assert_eq!(line["data"], "just a string");
    }

    #[test]
    fn appends_across_reopen_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("t.jsonl");

        for i in 0..2 {
            let logger = JsonlConversationLogger::open(&path).unwrap();
            logger.log(ConversationEvent::new("run", json!({"run": i})));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["run"], 1);
    }

    #[test]
    fn open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        assert!(JsonlConversationLogger::open(blocker.join("t.jsonl")).is_err());
    }
}
