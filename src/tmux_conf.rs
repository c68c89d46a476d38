//! Idempotent key-binding blocks inside a user's tmux config.

use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Keys tmux binds by default that people rarely want to lose.
const COMMON_DEFAULT_KEYS: &[&str] = &["c", "n", "p", "l", "z", "%", "\""];

/// Result of merging a block into config text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub content: String,
    pub changed: bool,
}

pub fn common_key_warning(key: &str) -> Option<String> {
    COMMON_DEFAULT_KEYS.contains(&key).then(|| {
        format!("key {key:?} is commonly used by tmux defaults; rebinding may override expected behavior")
    })
}

fn begin_marker(name: &str) -> String {
    format!("# tforge begin: {name}")
}

fn end_marker(name: &str) -> String {
    format!("# tforge end: {name}")
}

fn run_shell(script_path: &str) -> String {
    format!(
        "run-shell \"/usr/bin/env bash {}\"",
        shell_escape::unix::escape(Cow::Borrowed(script_path))
    )
}

/// Replace (or add) the `name` block so it binds `key` to `script_path`.
///
/// Any earlier block for `name` and any stray binding of the same script are
/// dropped; every other line is kept as-is and in order.
pub fn merge_block(content: &str, name: &str, key: &str, script_path: &str) -> Merge {
    let begin = begin_marker(name);
    let end = end_marker(name);
    let run = run_shell(script_path);

    let mut kept: Vec<&str> = Vec::new();
    let mut in_block = false;
    for line in content.split('\n') {
        let trimmed = line.trim();
        if trimmed == begin {
            in_block = true;
        } else if trimmed == end {
            in_block = false;
        } else if !in_block && !trimmed.contains(&run) {
            kept.push(line);
        }
    }

    while kept.last().is_some_and(|l| l.trim().is_empty()) {
        kept.pop();
    }

    let key = shell_escape::unix::escape(Cow::Borrowed(key));
    let mut merged = kept.join("\n");
    if !kept.is_empty() {
        merged.push_str("\n\n");
    }
    merged.push_str(&format!(
        "{begin}\nunbind-key {key}\nbind-key {key} {run}\n{end}\n"
    ));

    Merge {
        changed: merged != content,
        content: merged,
    }
}

/// Merge the block into the file at `path`, writing only when it changed.
///
/// The new content is computed in memory first and lands through a sibling
/// temp file renamed over the target, so a failed read or write leaves the
/// old file intact. A symlinked config is updated at its real location.
pub fn update_file(path: &Path, name: &str, key: &str, script_path: &str) -> Result<bool> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(Error::io(format!("Failed to read {}", path.display()))(err));
        }
    };

    let merge = merge_block(&existing, name, key, script_path);
    if !merge.changed {
        return Ok(false);
    }
    write_atomic(path, merge.content.as_bytes())?;
    tracing::debug!(path = %path.display(), name, "tmux config updated");
    Ok(true)
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let write_err = || Error::io(format!("Failed to write {}", target.display()));
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err())?;
    tmp.write_all(content).map_err(write_err())?;
    if let Ok(meta) = fs::metadata(&target) {
        fs::set_permissions(tmp.path(), meta.permissions()).map_err(write_err())?;
    }
    tmp.as_file().sync_all().map_err(write_err())?;
    tmp.persist(&target).map_err(|err| write_err()(err.error))?;
    Ok(())
}
