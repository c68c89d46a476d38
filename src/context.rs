use std::time::Duration;

use crate::cancel::CancelToken;
use crate::paths::Paths;
use crate::tmux::TmuxExecutor;

/// Everything a command needs that comes from the environment.
pub struct AppContext {
    pub paths: Paths,
    /// Whether this process runs inside a tmux client (`$TMUX` set).
    pub inside_tmux: bool,
    pub cancel: CancelToken,
    pub tmux: TmuxExecutor,
}

impl AppContext {
    pub fn new(paths: Paths, tmux_bin: &str, inside_tmux: bool, timeout: Option<Duration>) -> Self {
        let cancel = match timeout {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        };
        let tmux = TmuxExecutor::new(tmux_bin).with_cancel(cancel.clone());
        Self {
            paths,
            inside_tmux,
            cancel,
            tmux,
        }
    }
}
