//! Cancellation and deadline token threaded through external process calls.

use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time a process gets to unwind after Ctrl-C before it is forced out.
const INTERRUPT_GRACE: Duration = Duration::from_millis(500);

/// Exit code shells use for a process ended by SIGINT.
const INTERRUPT_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that trips by itself once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Wait for `child`, killing it if the token trips first.
    pub fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        loop {
            if let Some(status) = child
                .try_wait()
                .map_err(Error::io("Failed to poll child process"))?
            {
                return Ok(status);
            }
            if self.is_cancelled() {
                tracing::debug!(pid = child.id(), "cancelling child process");
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Cancelled);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Cancel this token on the first Ctrl-C.
    ///
    /// Running children are killed through [`CancelToken::wait`]. A process
    /// still alive after a short grace period (blocked reading a prompt, for
    /// instance) exits with status 130.
    pub fn cancel_on_interrupt(&self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::io("Failed to start interrupt handler"))?;
        let token = self.clone();
        thread::Builder::new()
            .name("tforge-interrupt".to_string())
            .spawn(move || {
                if runtime.block_on(tokio::signal::ctrl_c()).is_err() {
                    return;
                }
                tracing::debug!("interrupt received");
                token.cancel();
                thread::sleep(INTERRUPT_GRACE);
                std::process::exit(INTERRUPT_EXIT_CODE);
            })
            .map_err(Error::io("Failed to start interrupt handler"))?;
        Ok(())
    }
}
