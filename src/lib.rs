//! # image-dl
//!
//! Embeddable background service that downloads images to local storage and
//! answers callers over one-shot reply channels.
//!
//! ## Design Philosophy
//!
//! image-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Message-driven** - Callers hand over a request envelope with a reply
//!   channel inside; exactly one reply comes back per request
//! - **Boring on purpose** - One worker, one queue, no retries, no cache;
//!   failures collapse into a single canceled status
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_dl::{Config, DownloadImageService, RequestCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = DownloadImageService::new(Config::default())?;
//!
//!     let reply = service
//!         .download("https://example.com/cat.png", RequestCode::new(1), "/tmp/images")
//!         .await?
//!         .await?;
//!
//!     match reply.image_pathname() {
//!         Some(path) => println!("stored at {}", path.display()),
//!         None => eprintln!("download of {} failed", reply.source_url()),
//!     }
//!
//!     service.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// The download-to-file collaborator
pub mod fetcher;
/// The background service and its caller handle
pub mod service;
/// Request and response envelopes
pub mod types;
/// Destination naming helpers
pub mod utils;

// Re-export commonly used types
pub use config::{Config, FileCollisionAction};
pub use error::{Error, FetchError, Result};
pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use service::DownloadImageService;
pub use types::{DownloadReply, DownloadRequest, ReplyReceiver, ReplySender, RequestCode, Status};

/// Helper function to run the service with graceful signal handling.
///
/// Waits for a termination signal and then calls the service's `shutdown()`
/// method, draining requests that were already accepted.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use image_dl::{Config, DownloadImageService, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = DownloadImageService::new(Config::default())?;
///
///     // Hand out clones of `service` to request producers, then park here.
///     run_with_shutdown(service).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(service: DownloadImageService) -> Result<()> {
    wait_for_signal().await;
    service.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
