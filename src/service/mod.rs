//! The background download service and its caller handle
//!
//! One service instance owns one worker task fed by a bounded request queue.
//! The public value is the cloneable handle side; submitting a request hands
//! an envelope to the worker, which answers through the envelope's own
//! one-shot reply channel. Organized by concern:
//! - [`dispatch`] - the worker loop (decode, fetch, encode, deliver)
//! - [`lifecycle`] - graceful shutdown coordination

mod dispatch;
mod lifecycle;


use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{HttpImageFetcher, ImageFetcher};
use crate::types::{DownloadRequest, ReplyReceiver, RequestCode};

/// Handle to a running download service (cloneable - all fields are Arc-wrapped
/// or cheaply cloneable)
///
/// Dropping every clone does not stop the worker immediately: it drains what
/// was already accepted, then exits when the queue closes. Call
/// [`shutdown`](DownloadImageService::shutdown) for a coordinated stop.
#[derive(Clone)]
pub struct DownloadImageService {
    /// Sending side of the bounded request queue
    request_tx: mpsc::Sender<DownloadRequest>,
    /// Flag cleared when shutdown begins so new submissions fail fast
    accepting_new: Arc<AtomicBool>,
    /// Token observed by the worker to trigger its drain-and-exit path
    shutdown_token: CancellationToken,
    /// Worker task handle, taken exactly once during shutdown
    worker: Arc<tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>>,
    /// Configuration (wrapped in Arc for sharing across clones)
    config: Arc<Config>,
}

impl DownloadImageService {
    /// Start a service with the production HTTP fetcher
    ///
    /// Builds the shared HTTP client from `config` and spawns the worker
    /// task, so this must be called from within a Tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpImageFetcher::new(&config)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Start a service with a caller-supplied fetcher implementation
    ///
    /// The seam for tests and embedders that already have their own way of
    /// turning a URL into a stored file. Must be called from within a Tokio
    /// runtime.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ImageFetcher>) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let (request_tx, request_rx) = mpsc::channel(config.queue_capacity);
        let shutdown_token = CancellationToken::new();

        let worker = dispatch::Worker::new(Arc::clone(&fetcher), shutdown_token.clone());
        let handle = tokio::spawn(worker.run(request_rx));

        tracing::info!(
            fetcher = fetcher.name(),
            queue_capacity = config.queue_capacity,
            "download image service started"
        );

        Ok(Self {
            request_tx,
            accepting_new: Arc::new(AtomicBool::new(true)),
            shutdown_token,
            worker: Arc::new(tokio::sync::Mutex::new(Some(handle))),
            config,
        })
    }

    /// Submit a request envelope to the service
    ///
    /// Awaits queue capacity when the service is busy. Exactly one
    /// [`DownloadReply`](crate::types::DownloadReply) will be delivered to
    /// the envelope's reply channel once the request is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] if shutdown has begun; the envelope is
    /// dropped and its reply channel closes without a reply.
    pub async fn submit(&self, request: DownloadRequest) -> Result<()> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        self.request_tx
            .send(request)
            .await
            .map_err(|_| Error::ShuttingDown)
    }

    /// Encode and submit a request, returning the reply receiver
    ///
    /// Convenience wrapper pairing envelope construction with submission,
    /// the way callers almost always want it:
    ///
    /// ```no_run
    /// # use image_dl::{Config, DownloadImageService, RequestCode};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let service = DownloadImageService::new(Config::default())?;
    /// let reply = service
    ///     .download("https://example.com/cat.png", RequestCode::new(1), "/tmp/images")
    ///     .await?
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(
        &self,
        url: impl Into<String>,
        request_code: RequestCode,
        directory: impl Into<std::path::PathBuf>,
    ) -> Result<ReplyReceiver> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = DownloadRequest::new(url, request_code, directory, reply_tx);
        self.submit(request).await?;
        Ok(reply_rx)
    }

    /// Get the current configuration
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone.
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}
