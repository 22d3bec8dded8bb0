//! Ctrl+C handling shared by one-shot runs and the interactive shell.
//!
//! A single listener lives as long as the `Interrupts` value. While a run is
//! registered, Ctrl+C cancels it and the run stops before its next case. With
//! no run registered, Ctrl+C ends the process like the default handler would.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// Conventional status for a process ended by SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

pub struct Interrupts {
    active_run: Arc<RwLock<Option<CancellationToken>>>,
    listener: JoinHandle<()>,
}

impl Interrupts {
    pub fn install() -> Self {
        let active_run: Arc<RwLock<Option<CancellationToken>>> = Arc::new(RwLock::new(None));
        let slot = active_run.clone();
        let listener = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                match slot.write().await.take() {
                    Some(token) => {
                        eprintln!("\n⏹️  Stopping after the current case...");
                        token.cancel();
                    }
                    None => {
                        eprintln!("\n👋 Interrupted");
                        std::process::exit(INTERRUPTED_EXIT_CODE);
                    }
                }
            }
        });
        Self {
            active_run,
            listener,
        }
    }

    /// Register a new run and return the token Ctrl+C will cancel.
    pub async fn begin_run(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.active_run.write().await = Some(token.clone());
        debug!("Run registered for Ctrl+C");
        token
    }

    /// Unregister the current run so Ctrl+C ends the process again.
    pub async fn end_run(&self) {
        self.active_run.write().await.take();
        debug!("Run unregistered for Ctrl+C");
    }

    #[cfg(test)]
    async fn has_active_run(&self) -> bool {
        self.active_run.read().await.is_some()
    }
}

impl Drop for Interrupts {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
