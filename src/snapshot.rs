//! Builds a [`Session`] model from `list-windows` / `list-panes` rows.

use crate::error::{Error, Result, RowKind};
use crate::models::{Pane, Session, Window};
use crate::tmux::{self, TmuxRunner};

/// The two queries the snapshot builder needs from tmux.
pub trait SessionReader {
    fn list_windows(&self, session: &str) -> Result<Vec<String>>;
    fn list_panes(&self, target: &str) -> Result<Vec<String>>;
}

impl<T: TmuxRunner> SessionReader for T {
    fn list_windows(&self, session: &str) -> Result<Vec<String>> {
        tmux::list_windows(self, session)
    }

    fn list_panes(&self, target: &str) -> Result<Vec<String>> {
        tmux::list_panes(self, target)
    }
}

/// Capture `session` into a model. Nothing is returned unless every row parses.
pub fn capture_session(reader: &impl SessionReader, session: &str) -> Result<Session> {
    let window_rows = reader.list_windows(session)?;
    if window_rows.is_empty() {
        return Err(Error::NotFound(format!(
            "session {session:?} has no windows to capture"
        )));
    }

    let mut snapshot = Session {
        name: session.to_string(),
        windows: Vec::with_capacity(window_rows.len()),
        active_window: 0,
    };

    for row in &window_rows {
        let (mut window, active) = parse_window(row)?;
        if active {
            snapshot.active_window = window.index;
        }

        let target = format!("{}:{}", session, window.index);
        for pane_row in reader.list_panes(&target)? {
            let (pane, active) = parse_pane(&pane_row)?;
            tracing::trace!(window = %target, pane = %pane.id, path = %pane.path, "pane row");
            if active {
                window.active_pane = pane.index;
            }
            window.panes.push(pane);
        }
        tracing::debug!(
            window = window.index,
            panes = window.panes.len(),
            "captured window"
        );
        snapshot.windows.push(window);
    }

    Ok(snapshot)
}

fn parse_window(row: &str) -> Result<(Window, bool)> {
    let [index, name, layout, active] = split_row(row, RowKind::Window)?;
    let window = Window {
        index: parse_index(index, row, RowKind::Window)?,
        name: name.to_string(),
        layout: layout.to_string(),
        panes: Vec::new(),
        active_pane: 0,
    };
    Ok((window, active == "1"))
}

fn parse_pane(row: &str) -> Result<(Pane, bool)> {
    let [index, id, path, active] = split_row(row, RowKind::Pane)?;
    let pane = Pane {
        index: parse_index(index, row, RowKind::Pane)?,
        id: id.to_string(),
        path: path.to_string(),
    };
    Ok((pane, active == "1"))
}

fn split_row(row: &str, kind: RowKind) -> Result<[&str; 4]> {
    let fields: Vec<&str> = row.split('|').collect();
    <[&str; 4]>::try_from(fields).map_err(|fields| Error::Parse {
        kind,
        row: row.to_string(),
        detail: format!("expected 4 '|'-separated fields, got {}", fields.len()),
    })
}

fn parse_index(field: &str, row: &str, kind: RowKind) -> Result<u32> {
    field.parse().map_err(|e| Error::Parse {
        kind,
        row: row.to_string(),
        detail: format!("invalid index {field:?}: {e}"),
    })
}
