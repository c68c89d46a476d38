//! Interactive option picker.
//!
//! A raw-mode, keystroke-driven filter is used when the terminal can be put
//! into raw mode; otherwise a line-based numbered prompt takes over.

mod filter;
mod line;
mod raw;

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::prompt::Prompter;

use line::LineSelector;
use raw::{RawSelector, RawTerminal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableOption {
    pub id: String,
    pub label: String,
    pub detail: Option<String>,
}

impl SelectableOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// One way of letting the user pick an option. `Ok(None)` means nothing
/// was chosen.
pub trait Selector {
    fn select(&mut self, title: &str, options: &[SelectableOption]) -> Result<Option<String>>;
}

/// Pick one of `options`, preferring the raw-mode selector.
pub fn select<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    title: &str,
    options: &[SelectableOption],
) -> Result<Option<String>> {
    if options.is_empty() {
        return Ok(None);
    }
    match RawTerminal::acquire() {
        Ok(terminal) => RawSelector::new(terminal).select(title, options),
        Err(err) => {
            tracing::debug!(%err, "raw terminal unavailable, using line prompt");
            LineSelector::new(prompter).select(title, options)
        }
    }
}
