//! Raw-mode selector: single keystrokes drive a [`FilterState`].

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::filter::{FilterState, Key, Step};
use super::{SelectableOption, Selector};
use crate::error::{Error, Result};

static TERMINAL_HELD: AtomicBool = AtomicBool::new(false);

/// Exclusive raw-mode hold on the terminal. Dropping it restores the
/// terminal state captured when raw mode was entered.
pub struct RawTerminal {
    _private: (),
}

impl RawTerminal {
    pub fn acquire() -> io::Result<Self> {
        if TERMINAL_HELD.swap(true, Ordering::SeqCst) {
            return Err(io::Error::other("terminal is already in use by a selector"));
        }
        if let Err(err) = enable_raw_mode() {
            TERMINAL_HELD.store(false, Ordering::SeqCst);
            return Err(err);
        }
        // From here on, Drop undoes whatever was set up.
        let guard = RawTerminal { _private: () };
        execute!(io::stderr(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = execute!(io::stderr(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        TERMINAL_HELD.store(false, Ordering::SeqCst);
    }
}

pub struct RawSelector {
    _terminal: RawTerminal,
}

impl RawSelector {
    pub fn new(terminal: RawTerminal) -> Self {
        Self {
            _terminal: terminal,
        }
    }
}

impl Selector for RawSelector {
    fn select(&mut self, title: &str, options: &[SelectableOption]) -> Result<Option<String>> {
        let mut state = FilterState::new(options);
        let mut out = io::stderr();
        loop {
            render(&mut out, title, &state).map_err(Error::io("Failed to draw selector"))?;
            let event = event::read().map_err(Error::io("Failed to read key"))?;
            let Event::Key(key) = event else {
                continue;
            };
            let Some(key) = map_key(key) else {
                continue;
            };
            if let Step::Done(choice) = state.apply(key) {
                return Ok(choice);
            }
        }
    }
}

pub(crate) fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Some(Key::Cancel),
        KeyCode::Char('p') if ctrl => Some(Key::Up),
        KeyCode::Char('n') if ctrl => Some(Key::Down),
        KeyCode::Esc => Some(Key::Cancel),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Char(c) if !ctrl && !event.modifiers.contains(KeyModifiers::ALT) => {
            Some(Key::Char(c))
        }
        _ => None,
    }
}

fn render(out: &mut impl Write, title: &str, state: &FilterState<'_>) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    queue!(
        out,
        Print(format!("{title}\r\n")),
        Print("Type to filter • ↑/↓ to move • Enter to select • Esc to cancel\r\n"),
        Print(format!("Filter: {}\r\n\r\n", state.query()))
    )?;
    for (i, row) in state.visible().iter().enumerate() {
        let marker = if i == state.highlighted() { "▸ " } else { "  " };
        let line = if row.detail.trim().is_empty() {
            format!("{marker}{}\r\n", row.label)
        } else {
            format!("{marker}{} ({})\r\n", row.label, row.detail)
        };
        queue!(out, Print(line))?;
    }
    out.flush()
}
