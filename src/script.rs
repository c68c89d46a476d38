//! Compiles a [`Session`] into a bash script that rebuilds it.
//!
//! The script guards itself at runtime: an existing session that is still in
//! tmux's default shape (one window, one pane) is killed and rebuilt, any
//! other existing session is simply switched to or attached. Session
//! targets use tmux's `=` prefix so only an exact name match counts.

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::models::{Session, Window};

pub fn generate(session: &Session) -> Result<String> {
    validate(session)?;

    let name = quote(&session.name);
    let active = active_window(session);
    let mut script = String::new();

    script.push_str("#!/usr/bin/env bash\n");
    script.push_str("set -euo pipefail\n\n");
    script.push_str(&format!("SESSION={name}\n\n"));

    script.push_str("if tmux has-session -t \"=$SESSION\" 2>/dev/null; then\n");
    script.push_str("  WINDOWS=$(tmux list-windows -t \"=$SESSION\" | wc -l | tr -d ' ')\n");
    script.push_str("  PANES=$(tmux list-panes -s -t \"=$SESSION\" | wc -l | tr -d ' ')\n");
    script.push_str("  if [ \"$WINDOWS\" = \"1\" ] && [ \"$PANES\" = \"1\" ]; then\n");
    script.push_str("    tmux kill-session -t \"=$SESSION\"\n");
    script.push_str("  else\n");
    push_switch_or_attach(&mut script, "    ");
    script.push_str("    exit 0\n");
    script.push_str("  fi\n");
    script.push_str("fi\n\n");

    for (position, window) in session.windows.iter().enumerate() {
        push_window(&mut script, &session.name, window, position == 0);
        if position == active {
            script.push_str("ACTIVE_WINDOW=\"$WINDOW\"\n");
        }
        script.push('\n');
    }

    script.push_str("tmux select-window -t \"$ACTIVE_WINDOW\"\n");
    push_switch_or_attach(&mut script, "");
    Ok(script)
}

fn validate(session: &Session) -> Result<()> {
    if session.windows.is_empty() {
        return Err(Error::EmptySession {
            session: session.name.clone(),
        });
    }
    if let Some(window) = session.windows.iter().find(|w| w.panes.is_empty()) {
        return Err(Error::EmptyWindow {
            window: window.name.clone(),
        });
    }
    Ok(())
}

fn push_window(script: &mut String, session: &str, window: &Window, first: bool) {
    let name = quote(&window.name);
    // `validate` guarantees at least one pane.
    let first_path = clean_path(&window.panes[0].path);
    let first_path = quote(&first_path);

    if first {
        script.push_str(&format!(
            "WINDOW=$(tmux new-session -d -P -F '#{{window_id}}' -s {} -n {name} -c {first_path})\n",
            quote(session)
        ));
    } else {
        script.push_str(&format!(
            "WINDOW=$(tmux new-window -d -P -F '#{{window_id}}' -t {} -n {name} -c {first_path})\n",
            quote(&format!("={session}:"))
        ));
    }

    for pane in window.panes.iter().skip(1) {
        let path = clean_path(&pane.path);
        script.push_str(&format!(
            "tmux split-window -t \"$WINDOW\" -c {}\n",
            quote(&path)
        ));
    }

    script.push_str(&format!(
        "tmux select-layout -t \"$WINDOW\" {}\n",
        quote(&window.layout)
    ));
    script.push_str(&format!(
        "tmux select-pane -t \"$WINDOW.{}\"\n",
        window.active_pane
    ));
}

fn push_switch_or_attach(script: &mut String, indent: &str) {
    script.push_str(&format!("{indent}if [ -n \"${{TMUX:-}}\" ]; then\n"));
    script.push_str(&format!("{indent}  tmux switch-client -t \"=$SESSION\"\n"));
    script.push_str(&format!("{indent}else\n"));
    script.push_str(&format!("{indent}  tmux attach-session -t \"=$SESSION\"\n"));
    script.push_str(&format!("{indent}fi\n"));
}

/// Position of the recorded active window, falling back to the first one.
fn active_window(session: &Session) -> usize {
    session
        .windows
        .iter()
        .position(|w| w.index == session.active_window)
        .unwrap_or(0)
}

fn quote(value: &str) -> Cow<'_, str> {
    shell_escape::unix::escape(Cow::Borrowed(value))
}

/// Lexically clean a path: collapse separators, drop `.` and resolve `..`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
