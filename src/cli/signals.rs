//! Signal handling for graceful shutdown

use crate::workflow::CancellationToken;

/// Wait for SIGINT/SIGTERM (Ctrl+C elsewhere) and cancel `token`
///
/// The running step sees the cancellation through its `ActionContext`; the
/// executor stops before the next step.
pub async fn setup_signal_handlers(token: CancellationToken) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => {
                eprintln!("\nReceived SIGINT, shutting down...");
            }
            _ = sigterm.recv() => {
                eprintln!("\nReceived SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        eprintln!("\nReceived Ctrl+C, shutting down...");
    }

    tracing::info!("Shutdown requested");
    token.cancel();
    Ok(())
}
