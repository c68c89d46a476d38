/// A captured tmux session. Windows keep the order tmux listed them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub windows: Vec<Window>,
    pub active_window: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub index: u32,
    pub name: String,
    /// Opaque `#{window_layout}` string, replayed verbatim.
    pub layout: String,
    pub panes: Vec<Pane>,
    pub active_pane: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub index: u32,
    /// tmux pane id such as `%3`. Informational only.
    pub id: String,
    pub path: String,
}

impl Session {
    pub fn pane_count(&self) -> usize {
        self.windows.iter().map(|w| w.panes.len()).sum()
    }
}
