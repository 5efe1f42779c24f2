//! JSON line-delimited logging for experiment events.
//!
//! Records are appended to `logs/experiments.jsonl` (override with the
//! `LOGSIG_CDE_LOG` environment variable). Logging is best-effort: callers
//! report failures to stderr and continue.

use std::fs::{create_dir_all, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

const DEFAULT_LOG_PATH: &str = "logs/experiments.jsonl";
const LOG_PATH_VAR: &str = "LOGSIG_CDE_LOG";

#[derive(Serialize)]
struct Record<'a, T: Serialize> {
    timestamp: f64,
    event: &'a str,
    data: &'a T,
}

fn log_path() -> PathBuf {
    std::env::var_os(LOG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH))
}

/// Appends one event record as a single JSON line.
pub fn log_event<T: Serialize>(event: &str, data: &T) -> io::Result<()> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0);
    let record = Record {
        timestamp,
        event,
        data,
    };
    let line = serde_json::to_string(&record)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{line}")
}
