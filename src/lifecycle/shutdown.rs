//! Shutdown coordination for the API process.
//!
//! The signal task, the listener and the store snapshot all hang off one
//! `Shutdown`. It latches: a `ShutdownSignal` taken after `trigger` resolves
//! at once, so a server started late still drains instead of running on.

use tokio::sync::watch;

/// Owner side of the shutdown latch.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A future-producing handle for one long-running task.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Latch the shutdown. Idempotent; needs no live subscriber.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!(listeners = self.tx.receiver_count(), "Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of tasks still holding a signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side handed to the HTTP server.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown was triggered, or once its `Shutdown` is dropped.
    pub async fn triggered(mut self) {
        let _ = self.rx.wait_for(|fired| *fired).await;
    }
}
