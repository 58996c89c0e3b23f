//! JSONL file writer for workflow events.
//!
//! Each [`WorkflowEvent`] is serialized as a single JSON line carrying its
//! kebab-case `type` tag plus a `timestamp`, appended via a buffered writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;
use warroom_application::{ProgressNotifier, WorkflowEvent};

/// Event log that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and
/// on `Drop`.
pub struct JsonlEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventLogger {
    /// Create the log file (and parent directories).
    ///
    /// Returns `None` if the file cannot be created; the run continues
    /// without an event log.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create event log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressNotifier for JsonlEventLogger {
    fn on_event(&self, event: &WorkflowEvent) {
        let Ok(serde_json::Value::Object(mut record)) = serde_json::to_value(event) else {
            return;
        };
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        record.insert("timestamp".to_string(), serde_json::Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Failed to write event log {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlEventLogger {
    fn drop(&mut self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_one_tagged_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.events.jsonl");
        let logger = JsonlEventLogger::new(&path).unwrap();

        logger.on_event(&WorkflowEvent::PhaseStarted {
            phase: "security".to_string(),
            agent_count: 4,
        });
        logger.on_event(&WorkflowEvent::ConsensusComputed {
            consensus_level: 0.75,
            clusters: 3,
        });
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "phase-started");
        assert_eq!(lines[0]["agent_count"], 4);
        assert_eq!(lines[1]["type"], "consensus-computed");
        assert!(lines[1]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_unwritable_path_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        assert!(JsonlEventLogger::new(blocker.join("events.jsonl")).is_none());
    }
}
