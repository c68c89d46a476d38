//! tmux process boundary: the runner capability, the real executor and the
//! handful of queries the rest of the crate needs.

use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};

/// `list-windows -F` format consumed by the snapshot builder.
pub const LIST_WINDOWS_FORMAT: &str =
    "#{window_index}|#{window_name}|#{window_layout}|#{window_active}";

/// `list-panes -F` format consumed by the snapshot builder.
pub const LIST_PANES_FORMAT: &str =
    "#{pane_index}|#{pane_id}|#{pane_current_path}|#{pane_active}";

/// Runs a tmux command and returns its stdout. Mockable in tests.
pub trait TmuxRunner {
    fn run(&self, args: &[&str]) -> Result<String>;
}

impl<T: TmuxRunner + ?Sized> TmuxRunner for &T {
    fn run(&self, args: &[&str]) -> Result<String> {
        (**self).run(args)
    }
}

pub struct TmuxExecutor {
    tmux_bin: String,
    cancel: CancelToken,
}

impl TmuxExecutor {
    pub fn new(tmux_bin: impl Into<String>) -> Self {
        Self {
            tmux_bin: tmux_bin.into(),
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for TmuxExecutor {
    fn default() -> Self {
        Self::new("tmux")
    }
}

impl TmuxRunner for TmuxExecutor {
    fn run(&self, args: &[&str]) -> Result<String> {
        self.cancel.check()?;
        let command = args.join(" ");
        tracing::debug!(bin = %self.tmux_bin, %command, "running tmux");

        let mut child = Command::new(&self.tmux_bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Error::io(format!("Failed to run {} {}", self.tmux_bin, command)))?;

        // Drain both pipes off-thread so a chatty child never blocks on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = self.cancel.wait(&mut child)?;
        let stdout = collect(stdout)
            .map_err(Error::io(format!("Failed to read output of {command}")))?;
        let stderr = collect(stderr).unwrap_or_else(|err| {
            tracing::debug!(%command, error = %err, "failed to read tmux stderr");
            Vec::new()
        });

        if !status.success() {
            return Err(Error::CommandFailed {
                command,
                detail: format!(
                    "exit code {}: {}",
                    status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<io::Result<Vec<u8>>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked"))),
        None => Ok(Vec::new()),
    }
}

/// Non-empty, trimmed lines of command output.
pub fn split_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn list_sessions(runner: &impl TmuxRunner) -> Result<Vec<String>> {
    let output = runner.run(&["list-sessions", "-F", "#{session_name}"])?;
    Ok(split_lines(&output))
}

pub fn session_exists(runner: &impl TmuxRunner, session: &str) -> Result<bool> {
    Ok(list_sessions(runner)?.iter().any(|s| s == session))
}

/// Name of the session this process runs in, if it runs inside tmux at all.
pub fn current_session(runner: &impl TmuxRunner, inside_tmux: bool) -> Result<Option<String>> {
    if !inside_tmux {
        return Ok(None);
    }
    let output = runner.run(&["display-message", "-p", "#S"])?;
    let name = output.trim();
    Ok((!name.is_empty()).then(|| name.to_string()))
}

pub fn list_windows(runner: &impl TmuxRunner, session: &str) -> Result<Vec<String>> {
    let output = runner.run(&["list-windows", "-t", session, "-F", LIST_WINDOWS_FORMAT])?;
    Ok(split_lines(&output))
}

pub fn list_panes(runner: &impl TmuxRunner, target: &str) -> Result<Vec<String>> {
    let output = runner.run(&["list-panes", "-t", target, "-F", LIST_PANES_FORMAT])?;
    Ok(split_lines(&output))
}

pub fn source_file(runner: &impl TmuxRunner, path: &str) -> Result<()> {
    runner.run(&["source-file", path]).map(|_| ())
}
