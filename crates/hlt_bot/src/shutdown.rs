//! Graceful shutdown on SIGINT/SIGTERM.
//!
//! A background thread runs a single-threaded tokio runtime that waits for
//! a termination signal. When one arrives it raises the shared flag, which
//! the game loop checks between turns, then gives the loop a grace period
//! to finish before forcing the process to exit.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

/// Default time the game loop gets to wrap up after a signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a flag that is never raised by a signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flag and start the signal listener thread.
    ///
    /// After a signal the process exits with status 0 once `grace` has
    /// passed, whether or not the game loop has returned.
    ///
    /// # Errors
    /// Returns an error if the runtime or the listener thread cannot be
    /// created.
    pub fn install(grace: Duration) -> io::Result<Self> {
        let signal = Self::new();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let flag = signal.clone();
        thread::Builder::new()
            .name("shutdown".into())
            .spawn(move || {
                runtime.block_on(wait_for_signal());
                flag.request();
                info!(grace_ms = grace.as_millis() as u64, "Shutdown requested, finishing current turn");
                thread::sleep(grace);
                info!("Grace period over, exiting");
                std::process::exit(0);
            })?;

        Ok(signal)
    }

    /// Raise the flag.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    () = ctrl_c() => info!("Caught SIGINT"),
                    _ = terminate.recv() => info!("Caught SIGTERM"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM, only SIGINT will stop the bot");
                ctrl_c().await;
                info!("Caught SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
        info!("Caught Ctrl-C");
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for SIGINT");
        std::future::pending::<()>().await;
    }
}
