//! Trailing debounce built on a single deferred task token.
//!
//! Every [`Debounce::schedule`] aborts the pending task and bumps the
//! token, so only the last call in a burst ever reports back.  The token
//! is still checked on receipt because a task can finish sleeping and
//! queue its message just before being aborted.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub struct Debounce {
    delay: Duration,
    token: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<u64>,
}

impl Debounce {
    /// Fired tokens are delivered on `tx` once `delay` passes quietly.
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<u64>) -> Self {
        Self {
            delay,
            token: 0,
            pending: None,
            tx,
        }
    }

    /// Cancel any pending task and start a new quiet period.
    pub fn schedule(&mut self) {
        self.cancel();
        self.token = self.token.wrapping_add(1);
        let token = self.token;
        // The window starts now, not when the task is first polled.
        let deadline = Instant::now() + self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(token);
        }));
    }

    /// Drop the pending task, if any.  Its token becomes stale.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.token = self.token.wrapping_add(1);
    }

    /// Whether a received token belongs to the latest schedule.
    pub fn is_current(&self, token: u64) -> bool {
        token == self.token
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
