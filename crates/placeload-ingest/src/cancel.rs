//! Operator interrupt handling
//!
//! The first SIGINT/SIGTERM cancels a shared token; the pipeline notices it
//! between records, commits what it has buffered and stops. A second signal
//! exits the process at once with the interrupt exit code.

use placeload_common::error::EXIT_INTERRUPTED;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Listens for SIGINT (Ctrl+C) and, on unix, SIGTERM
struct SignalListener {
    #[cfg(unix)]
    terminate: Option<signal::unix::Signal>,
}

impl SignalListener {
    fn install() -> Self {
        #[cfg(unix)]
        let terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                None
            },
        };

        Self {
            #[cfg(unix)]
            terminate,
        }
    }

    /// Wait for the next signal and return its name
    async fn recv(&mut self) -> &'static str {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            let received = match self.terminate.as_mut() {
                Some(signal) => signal.recv().await.is_some(),
                None => false,
            };
            if !received {
                std::future::pending::<()>().await;
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => "SIGINT",
            _ = terminate => "SIGTERM",
        }
    }
}

/// Spawn the signal monitor and return the token it cancels.
///
/// Must be called from within a tokio runtime.
pub fn spawn_monitor() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();

    tokio::spawn(async move {
        let mut listener = SignalListener::install();

        let first = listener.recv().await;
        warn!(
            signal = first,
            "Interrupt received, committing buffered documents before stopping (send again to abort)"
        );
        cancel.cancel();

        let second = listener.recv().await;
        error!(signal = second, "Second interrupt received, aborting without flushing");
        std::process::exit(i32::from(EXIT_INTERRUPTED));
    });

    token
}
