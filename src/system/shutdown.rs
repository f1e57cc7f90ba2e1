//! Graceful shutdown
//!
//! Waits for OS signals and stops a running [`System`].

use super::System;
use crate::error::Result;
use std::future::Future;
use tokio::signal;

impl System {
    /// Wait for Ctrl+C or SIGTERM, then stop the system
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut system = wireup.start(config, ["server"]).await?;
    /// system.run_until_signal().await?;
    /// ```
    pub async fn run_until_signal(&mut self) -> Result<()> {
        self.stop_when(shutdown_signal()).await
    }

    /// Wait for `trigger` to complete, then stop the system.
    ///
    /// An error from the trigger is returned without stopping.
    pub async fn stop_when<F>(&mut self, trigger: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        trigger.await?;
        tracing::info!("Starting graceful shutdown...");
        self.stop().await?;
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}

/// Create a future that completes when a shutdown signal is received
///
/// # Example
///
/// ```rust,ignore
/// use wireup::system::shutdown_signal;
///
/// tokio::select! {
///     _ = shutdown_signal() => {
///         println!("Shutdown signal received");
///     }
///     _ = server.serve() => {}
/// }
/// ```
pub async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                tracing::info!("Received Ctrl+C signal");
            },
            _ = terminate.recv() => {
                tracing::info!("Received SIGTERM signal");
            },
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        tracing::info!("Received Ctrl+C signal");
    }

    Ok(())
}
