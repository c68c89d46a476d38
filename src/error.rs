//! Error taxonomy shared by the capture, generation and selection paths.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which kind of `list-*` row failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Window,
    Pane,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Window => f.write_str("window"),
            RowKind::Pane => f.write_str("pane"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("invalid tmux {kind} row {row:?}: {detail}")]
    Parse {
        kind: RowKind,
        row: String,
        detail: String,
    },

    #[error("session {session:?} has no windows")]
    EmptySession { session: String },

    #[error("window {window:?} has no panes")]
    EmptyWindow { window: String },

    #[error("tmux {command}: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid journal {}", path.display())]
    Journal {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0} cancelled")]
    UserCancelled(&'static str),
}

impl Error {
    pub fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> Error {
        let context = context.into();
        move |source| Error::Io { context, source }
    }
}
