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

//! Child process execution with a deadline.
//!
//! Exit status 0 is success; anything else, including failing to spawn,
//! is a [`CommandError`].

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;
use thiserror::Error;

use crate::logger;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("cannot run `{command}`: {source}")]
    Spawn { command: String, source: io::Error },
    #[error("lost track of `{command}`: {source}")]
    Wait { command: String, source: io::Error },
    #[error("`{command}` {}{}", describe_code(.code), describe_stderr(.stderr))]
    Failed { command: String, code: Option<i32>, stderr: String },
    #[error("`{command}` timed out after {}ms", .timeout.as_millis())]
    TimedOut { command: String, timeout: Duration },
    #[error("`{command}` was cancelled")]
    Cancelled { command: String },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with status {}", c),
        None => "was terminated by a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() { String::new() } else { format!(": {}", stderr) }
}

fn command_line(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}

#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `program` with `args` to completion, or until `timeout` elapses.
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<(), CommandError>;
}

/// Shared flag that aborts a running [`SystemCommandRunner`] invocation.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct SystemCommandRunner {
    cancel: CancelHandle,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<(), CommandError> {
        let command = command_line(program, args);
        if self.cancel.is_cancelled() {
            return Err(CommandError::Cancelled { command });
        }

        logger::debug("command_spawn", json!({ "command": command, "timeout_ms": timeout.as_millis() as u64 }));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn { command: command.clone(), source })?;

        // Drain stderr on its own thread so a chatty child cannot fill the pipe.
        // A background grandchild may hold the pipe open past our child's exit,
        // so the result comes back over a channel instead of a join.
        let (stderr_tx, stderr_rx) = mpsc::channel();
        let stderr_pipe = child.stderr.take();
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            let _ = stderr_tx.send(String::from_utf8_lossy(&buf).trim().to_string());
        });

        let start = Instant::now();
        let status = loop {
            if self.cancel.is_cancelled() {
                kill_and_reap(&mut child);
                return Err(CommandError::Cancelled { command });
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= timeout {
                        kill_and_reap(&mut child);
                        return Err(CommandError::TimedOut { command, timeout });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    kill_and_reap(&mut child);
                    return Err(CommandError::Wait { command, source });
                }
            }
        };

        if status.success() {
            return Ok(());
        }
        let stderr = stderr_rx
            .recv_timeout(timeout.saturating_sub(start.elapsed()))
            .unwrap_or_default();
        Err(CommandError::Failed { command, code: status.code(), stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_success_exit() {
        let runner = SystemCommandRunner::new();
        assert!(runner.run("true", &[], Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_nonzero_exit_captures_stderr() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .run("sh", &args(&["-c", "echo 'unit not found' >&2; exit 5"]), Duration::from_secs(5))
            .unwrap_err();
        match err {
            CommandError::Failed { code, ref stderr, .. } => {
                assert_eq!(code, Some(5));
                assert_eq!(stderr, "unit not found");
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(err.to_string().contains("exited with status 5: unit not found"));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .run("/nonexistent/allyfan-helper", &args(&["balanced"]), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/allyfan-helper balanced"));
    }

    #[test]
    fn test_timeout_kills_child() {
        let runner = SystemCommandRunner::new();
        let start = Instant::now();
        let err = runner.run("sleep", &args(&["5"]), Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(err.to_string().contains("timed out after 100ms"));
    }

    #[test]
    fn test_background_grandchild_does_not_outlive_timeout() {
        let runner = SystemCommandRunner::new();
        let start = Instant::now();
        let res = runner.run("sh", &args(&["-c", "sleep 3 & exit 0"]), Duration::from_millis(200));
        assert!(res.is_ok());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_failure_with_background_grandchild_is_bounded() {
        let runner = SystemCommandRunner::new();
        let start = Instant::now();
        let err = runner
            .run("sh", &args(&["-c", "sleep 3 & exit 4"]), Duration::from_millis(200))
            .unwrap_err();
        assert!(matches!(err, CommandError::Failed { code: Some(4), .. }));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_cancel_before_run() {
        let runner = SystemCommandRunner::new();
        let handle = runner.cancel_handle();
        handle.cancel();
        let err = runner.run("true", &[], Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, CommandError::Cancelled { .. }));

        handle.reset();
        assert!(runner.run("true", &[], Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_cancel_while_running() {
        let runner = SystemCommandRunner::new();
        let handle = runner.cancel_handle();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            handle.cancel();
        });
        let start = Instant::now();
        let err = runner.run("sleep", &args(&["5"]), Duration::from_secs(30)).unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, CommandError::Cancelled { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
