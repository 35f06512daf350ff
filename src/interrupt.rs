use log::{debug, error};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

// @module: User interruption of a running transfer

#[derive(Debug, Default)]
struct Inner {
    raised: AtomicBool,
    notify: Notify,
}

/// Cloneable stop flag shared between the signal listener and the copy loop
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    inner: Arc<Inner>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the transfer to stop
    pub fn raise(&self) {
        self.inner.raised.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::SeqCst)
    }

    /// Resolve once the flag has been raised
    pub async fn raised(&self) {
        loop {
            // Register before checking so a raise in between is not missed
            let notified = self.inner.notify.notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }

    /// Raise this flag on the first Ctrl+C. Later presses are ignored, so the
    /// copy loop always reaches its final report.
    pub fn listen_for_ctrl_c(&self) -> JoinHandle<()> {
        self.raise_when(tokio::signal::ctrl_c())
    }

    /// Raise this flag once `signal` resolves successfully
    pub fn raise_when<F>(&self, signal: F) -> JoinHandle<()>
    where
        F: Future<Output = io::Result<()>> + Send + 'static,
    {
        let flag = self.clone();
        tokio::spawn(async move {
            match signal.await {
                Ok(()) => {
                    debug!("Ctrl+C received, stopping after the current chunk");
                    flag.raise();
                }
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
        })
    }
}
