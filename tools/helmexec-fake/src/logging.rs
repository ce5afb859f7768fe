use crate::errors::HelmExecError;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), HelmExecError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| HelmExecError::Io(e.to_string()))?;
        }
        let mut line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncate_json(event.payload.clone(), self.max_payload_bytes),
        })
        .map_err(|e| HelmExecError::Io(e.to_string()))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HelmExecError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| HelmExecError::Io(e.to_string()))
    }
}

static RUN_LOGGER: OnceLock<Mutex<Option<JsonlLogger>>> = OnceLock::new();

fn logger_slot() -> &'static Mutex<Option<JsonlLogger>> {
    RUN_LOGGER.get_or_init(|| Mutex::new(None))
}

/// Route `append_run_log` events to a JSONL file at `path`.
pub fn init_run_logger(path: impl AsRef<Path>) -> Result<(), HelmExecError> {
    let logger = JsonlLogger::new(path);
    if let Some(parent) = logger.path.parent() {
        fs::create_dir_all(parent).map_err(|e| HelmExecError::Io(e.to_string()))?;
    }
    *logger_slot().lock().expect("run logger lock") = Some(logger);
    Ok(())
}

pub fn clear_run_logger() {
    *logger_slot().lock().expect("run logger lock") = None;
}

/// Emit an event to the run log. No-op when no logger is installed; write failures are dropped.
///
/// The slot lock is held for the whole write so concurrent callers never interleave lines.
pub fn append_run_log(level: &str, event_type: &str, payload: Value) {
    let slot = logger_slot().lock().expect("run logger lock");
    if let Some(logger) = slot.as_ref() {
        let _ = logger.append(&LogEvent {
            level,
            event_type,
            payload,
        });
    }
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}
