//! Cancellation token shared by the generator, the run timer and the Ctrl-C handler.
//!
//! Two views of the same event:
//! - an atomic flag for loops that poll between ticks (spin pacing)
//! - a channel that disconnects on cancel, so blocked `select!` arms wake immediately

use crossbeam::channel::{bounded, Receiver, Sender};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

#[derive(Clone)]
pub struct Shutdown {
    cancelled: Arc<AtomicBool>,
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Idempotent. Every clone observes the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        let mut trigger = match self.trigger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // dropping the only sender disconnects every signal receiver
        trigger.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Never yields a message; becomes ready (disconnected) once cancelled.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    /// Blocks for at most `timeout`. Returns true if cancelled in the meantime.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        // Err(Timeout) -> still running, Err(Disconnected) -> cancelled
        self.signal.recv_timeout(timeout).is_err() && self.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
