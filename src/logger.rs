/*
 * This file is part of Allyfan.
 *
 * Copyright (C) 2025 Allyfan contributors
 *
 * Allyfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Allyfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Allyfan. If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const FALLBACK_LOG_PATH: &str = "/tmp/allyfan_logs.json";

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

struct Sink {
    file: Option<File>,
    min_level: Level,
}

lazy_static! {
    static ref SINK: Mutex<Sink> = Mutex::new(Sink { file: None, min_level: Level::Info });
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Open `path` for appending JSON log lines. Falls back to `/tmp` silently
/// when the requested location is not writable.
pub fn init_logging(path: &Path, min_level: Level) {
    let file = open_append(path).or_else(|| open_append(Path::new(FALLBACK_LOG_PATH)));
    match SINK.lock() {
        Ok(mut guard) => {
            guard.file = file;
            guard.min_level = min_level;
        }
        Err(poisoned) => {
            let mut guard = poisoned.into_inner();
            guard.file = file;
            guard.min_level = min_level;
        }
    }
}

pub fn set_min_level(level: Level) {
    match SINK.lock() {
        Ok(mut guard) => guard.min_level = level,
        Err(poisoned) => poisoned.into_inner().min_level = level,
    }
}

pub fn log_event(level: Level, event: &str, data: Value) {
    let line = json!({
        "ts_ms": now_millis(),
        "level": level,
        "event": event,
        "data": data,
    })
    .to_string();

    if let Ok(mut guard) = SINK.lock() {
        if level < guard.min_level {
            return;
        }
        if let Some(f) = guard.file.as_mut() {
            let _ = writeln!(f, "{}", line);
            return;
        }
    }
    // Not initialized: debug chatter is dropped, anything louder goes to /tmp
    if level == Level::Debug {
        return;
    }
    if let Some(mut f) = open_append(Path::new(FALLBACK_LOG_PATH)) {
        let _ = writeln!(f, "{}", line);
    }
}

pub fn debug(event: &str, data: Value) {
    log_event(Level::Debug, event, data);
}

pub fn info(event: &str, data: Value) {
    log_event(Level::Info, event, data);
}

pub fn warn(event: &str, data: Value) {
    log_event(Level::Warn, event, data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    // Other tests log through the same global sink, so only look at our own events
    fn read_lines(path: &Path, prefix: &str) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap())
            .filter(|v| v["event"].as_str().map(|e| e.starts_with(prefix)).unwrap_or(false))
            .collect()
    }

    #[test]
    fn test_level_parse_and_display() {
        assert_eq!("DEBUG".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert!("loud".parse::<Level>().is_err());
        assert_eq!(Level::Error.to_string(), "error");
        assert!(Level::Debug < Level::Info);
    }

    #[test]
    #[serial]
    fn test_log_event_writes_json_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("allyfan.json");
        init_logging(&path, Level::Debug);

        info("logtest_loaded", json!({}));
        debug("logtest_fan_read_failed", json!({ "field": "cpu_rpm" }));

        let lines = read_lines(&path, "logtest_");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "logtest_loaded");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[1]["level"], "debug");
        assert_eq!(lines[1]["data"]["field"], "cpu_rpm");
        assert!(lines[1]["ts_ms"].is_u64());
    }

    #[test]
    #[serial]
    fn test_min_level_filters_debug() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("allyfan.json");
        init_logging(&path, Level::Info);

        debug("filtertest_noise", json!({}));
        warn("filtertest_apply_failed", json!({ "error": "boom" }));
        set_min_level(Level::Error);
        warn("filtertest_dropped", json!({}));
        set_min_level(Level::Info);

        let lines = read_lines(&path, "filtertest_");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], "filtertest_apply_failed");
    }
}
