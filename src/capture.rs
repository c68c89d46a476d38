use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::context::AppContext;
use crate::error::Error;
use crate::journal::{self, Entry, Journal};
use crate::models::Session;
use crate::paths;
use crate::prompt::Prompter;
use crate::selector::{self, SelectableOption};
use crate::{script, snapshot, tmux, tmux_conf, ui};

#[derive(Debug, Default)]
pub struct CaptureOptions {
    pub session: Option<String>,
    pub name: Option<String>,
    pub key: Option<String>,
    pub no_bind: bool,
}

pub fn capture_tmux_session<R: BufRead, W: Write>(
    ctx: &AppContext,
    opts: CaptureOptions,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let session = match opts.session {
        Some(session) => session,
        None => pick_session(ctx, prompter)?,
    };

    if !tmux::session_exists(&ctx.tmux, &session)? {
        return Err(Error::NotFound(format!("tmux session {session:?} does not exist")).into());
    }

    let save_name = match opts.name {
        Some(name) => name,
        None => prompter.ask_default("Save layout as", &session)?,
    };
    let script_path = ctx.paths.script(&save_name)?;

    let snapshot = snapshot::capture_session(&ctx.tmux, &session)
        .with_context(|| format!("Failed to capture session {session}"))?;
    let content = script::generate(&snapshot)?;
    paths::write_executable(&script_path, content.as_bytes())?;
    ui::info(format!("Wrote script: {}", script_path.display()));

    if let Err(err) = record(ctx, &snapshot, &script_path, &content) {
        ui::warn(format!("unable to update journal: {err:#}"));
    }

    if !opts.no_bind {
        bind_key(ctx, opts.key, &save_name, &script_path, prompter)?;
    }

    ui::info("Done.");
    Ok(())
}

fn pick_session<R: BufRead, W: Write>(
    ctx: &AppContext,
    prompter: &mut Prompter<R, W>,
) -> Result<String> {
    match tmux::current_session(&ctx.tmux, ctx.inside_tmux) {
        Ok(Some(current)) => {
            ui::info(format!("Current tmux session detected: {current}"));
            return Ok(current);
        }
        Ok(None) => {}
        Err(err) => tracing::debug!(%err, "could not detect current session"),
    }

    let options: Vec<SelectableOption> = tmux::list_sessions(&ctx.tmux)?
        .into_iter()
        .map(|s| SelectableOption::new(s.clone(), s))
        .collect();
    if options.is_empty() {
        return Err(Error::NotFound("no tmux sessions are running".to_string()).into());
    }
    selector::select(prompter, "Select tmux session to capture", &options)?
        .ok_or_else(|| Error::UserCancelled("capture").into())
}

fn record(ctx: &AppContext, snapshot: &Session, script_path: &Path, content: &str) -> Result<()> {
    let path = ctx.paths.journal();
    let mut journal = Journal::load(&path)?;
    journal.upsert(Entry {
        session: snapshot.name.clone(),
        script_path: script_path.to_path_buf(),
        windows: snapshot.windows.len(),
        panes: snapshot.pane_count(),
        captured_at: chrono::Utc::now(),
        script_sha256: Some(journal::script_digest(content.as_bytes())),
    });
    journal.save(&path)?;
    Ok(())
}

fn bind_key<R: BufRead, W: Write>(
    ctx: &AppContext,
    key: Option<String>,
    save_name: &str,
    script_path: &Path,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None if prompter.ask_yes_no("Add tmux keybinding", false)? => {
            prompter.ask("Bind to key (prefix + key)")?
        }
        None => String::new(),
    };
    let key = key.trim();
    if key.is_empty() {
        ui::info("Keybinding skipped.");
        return Ok(());
    }

    if let Some(warning) = tmux_conf::common_key_warning(key) {
        ui::warn(warning);
    }

    let conf = ctx.paths.tmux_conf();
    let changed = tmux_conf::update_file(&conf, save_name, key, &script_path.to_string_lossy())?;
    if changed {
        ui::info(format!("Updated tmux config: {}", conf.display()));
        match tmux::source_file(&ctx.tmux, &conf.to_string_lossy()) {
            Ok(()) => ui::info("Reloaded tmux config."),
            Err(err) => ui::warn(format!("unable to reload tmux config automatically: {err}")),
        }
    } else {
        ui::info(format!("Tmux config already up-to-date: {}", conf.display()));
    }
    ui::info(format!("Bound key: prefix + {key}"));
    Ok(())
}
