//! Shutdown coordination.

use crate::error::Result;

use super::DownloadImageService;

impl DownloadImageService {
    /// Gracefully shut down the service
    ///
    /// Shutdown sequence:
    /// 1. Stop accepting new requests (`submit` fails with `ShuttingDown`)
    /// 2. Signal the worker, which closes the queue and drains every request
    ///    already accepted - each still gets its one reply
    /// 3. Wait for the worker to finish, bounded by `shutdown_grace`
    ///
    /// Safe to call from any clone of the handle, and more than once; later
    /// calls are no-ops.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("initiating graceful shutdown");

        self.accepting_new
            .store(false, std::sync::atomic::Ordering::SeqCst);
        self.shutdown_token.cancel();

        let handle = { self.worker.lock().await.take() };

        match handle {
            Some(handle) => {
                match tokio::time::timeout(self.config.shutdown_grace, handle).await {
                    Ok(Ok(())) => tracing::info!("worker drained and stopped"),
                    Ok(Err(e)) => tracing::error!(error = %e, "worker task failed"),
                    Err(_) => tracing::warn!(
                        grace = ?self.config.shutdown_grace,
                        "timed out waiting for worker to drain"
                    ),
                }
            }
            None => tracing::debug!("shutdown already performed"),
        }

        tracing::info!("graceful shutdown complete");
        Ok(())
    }
}
