use anyhow::{bail, Context, Result};
use chrono::SecondsFormat;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;

use crate::cancel::CancelToken;
use crate::context::AppContext;
use crate::error::Error;
use crate::journal::{self, Entry, Journal};
use crate::prompt::Prompter;
use crate::selector::{self, SelectableOption};
use crate::ui;

pub fn restore_tmux_session<R: BufRead, W: Write>(
    ctx: &AppContext,
    session: Option<String>,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let journal_path = ctx.paths.journal();
    let journal = Journal::load(&journal_path)?;
    if journal.entries.is_empty() {
        return Err(Error::NotFound(
            "no saved sessions found; run 'tforge capture' first".to_string(),
        )
        .into());
    }

    let session = match session {
        Some(session) => session,
        None => selector::select(
            prompter,
            "Select a saved session to restore",
            &journal_options(&journal),
        )?
        .ok_or(Error::UserCancelled("restore"))?,
    };

    let entry = journal.find(&session).ok_or_else(|| {
        Error::NotFound(format!(
            "session {session:?} is not in journal {}",
            journal_path.display()
        ))
    })?;
    ui::info(format!(
        "Restoring {} (windows={}, panes={})",
        entry.session, entry.windows, entry.panes
    ));

    check_script(entry)?;
    run_script(&ctx.cancel, &entry.script_path)
}

fn journal_options(journal: &Journal) -> Vec<SelectableOption> {
    journal
        .entries
        .iter()
        .map(|e| {
            SelectableOption::new(e.session.clone(), e.session.clone()).with_detail(format!(
                "windows={} panes={} captured={}",
                e.windows,
                e.panes,
                e.captured_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ))
        })
        .collect()
}

/// Fail if the script is gone; warn if it changed since capture.
fn check_script(entry: &Entry) -> Result<()> {
    let content = match fs::read(&entry.script_path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!(
                "script {} for session {:?} is missing; capture it again",
                entry.script_path.display(),
                entry.session
            ))
            .into());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read {}", entry.script_path.display()));
        }
    };
    if let Some(expected) = &entry.script_sha256 {
        if *expected != journal::script_digest(&content) {
            ui::warn(format!(
                "{} was modified after capture; running it anyway",
                entry.script_path.display()
            ));
        }
    }
    Ok(())
}

fn run_script(cancel: &CancelToken, script: &Path) -> Result<()> {
    tracing::debug!(script = %script.display(), "running restore script");
    let mut child = Command::new("/usr/bin/env")
        .arg("bash")
        .arg(script)
        .spawn()
        .context("Failed to start restore script")?;
    let status = cancel.wait(&mut child)?;
    if !status.success() {
        bail!("restore script failed: {status}");
    }
    Ok(())
}
