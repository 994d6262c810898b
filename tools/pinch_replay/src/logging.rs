use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;

pub const LOG_JSON_PATH_ENV: &str = "PINCH_REPLAY_LOG_JSON_PATH";

/// Writes log records to stderr and, optionally, as JSON lines to a file.
pub struct ReplayLogger {
    level: LevelFilter,
    json_file: Mutex<Option<File>>,
}

impl ReplayLogger {
    pub fn from_env(level: LevelFilter) -> Result<Self> {
        let path = std::env::var(LOG_JSON_PATH_ENV).ok();
        Self::new(level, path.map(PathBuf::from))
    }

    pub fn new(level: LevelFilter, path: Option<PathBuf>) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                Some(file)
            }
            None => None,
        };
        Ok(Self {
            level,
            json_file: Mutex::new(json_file),
        })
    }

    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).context("logger already installed")?;
        log::set_max_level(level);
        Ok(())
    }

    fn write_json(&self, level: Level, target: &str, message: &str) {
        let Ok(mut guard) = self.json_file.lock() else {
            return;
        };
        let Some(file) = guard.as_mut() else {
            return;
        };

        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let entry = json!({
            "ts_ms": ts_ms,
            "level": level.as_str().to_ascii_lowercase(),
            "target": target,
            "msg": message,
        });

        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }
}

impl Log for ReplayLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        eprintln!("[{}] {}", record.level().as_str().to_ascii_lowercase(), message);
        self.write_json(record.level(), record.target(), &message);
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.json_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_are_appended_for_enabled_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("replay.jsonl");
        let logger = ReplayLogger::new(LevelFilter::Info, Some(path.clone())).expect("logger");

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("pinchsense")
                .args(format_args!("pinch: settings"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("pinchsense")
                .args(format_args!("pinch: none -> started"))
                .build(),
        );

        let contents = fs::read_to_string(&path).expect("log file");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let entry: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(entry["level"], "info");
        assert_eq!(entry["target"], "pinchsense");
        assert_eq!(entry["msg"], "pinch: settings");
    }
}
