//! The worker loop: decode request, fetch, encode reply, deliver.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::fetcher::ImageFetcher;
use crate::types::{DownloadReply, DownloadRequest};

/// The single worker behind a service instance
///
/// Requests are handled strictly one at a time in queue order; the fetch
/// blocks this worker until it resolves. Concurrency across requests is a
/// caller concern (run several service instances), not a worker one.
pub(crate) struct Worker {
    fetcher: Arc<dyn ImageFetcher>,
    shutdown: CancellationToken,
}

impl Worker {
    pub(crate) fn new(fetcher: Arc<dyn ImageFetcher>, shutdown: CancellationToken) -> Self {
        Self { fetcher, shutdown }
    }

    /// Serve requests until every handle is dropped or shutdown drains the queue
    ///
    /// On shutdown the queue is closed first, then every request already
    /// accepted is still handled, preserving the one-reply-per-request
    /// contract.
    pub(crate) async fn run(self, mut requests: mpsc::Receiver<DownloadRequest>) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    requests.close();
                    let mut drained = 0_usize;
                    while let Some(request) = requests.recv().await {
                        self.handle_request(request).await;
                        drained += 1;
                    }
                    if drained > 0 {
                        tracing::info!(drained, "handled remaining requests during shutdown");
                    }
                    break;
                }
                maybe_request = requests.recv() => match maybe_request {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
            }
        }

        tracing::info!("download image worker stopped");
    }

    /// Handle one request end to end
    ///
    /// Every fetch failure collapses into a plain `Canceled` reply; the
    /// reason only reaches the log. A reply channel whose receiver is gone
    /// is logged and dropped - there is no one left to tell.
    async fn handle_request(&self, request: DownloadRequest) {
        let (source_url, request_code, directory, reply) = request.into_parts();

        tracing::info!(
            url = %source_url,
            request_code = %request_code,
            directory = %directory.display(),
            "request received"
        );

        let stored = match self.fetcher.fetch(&source_url, &directory).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(
                    url = %source_url,
                    request_code = %request_code,
                    error = %e,
                    "download failed"
                );
                None
            }
        };

        let reply_message = DownloadReply::new(stored, source_url);
        let status = reply_message.status();

        if reply.send(reply_message).is_err() {
            tracing::warn!(
                request_code = %request_code,
                "reply channel closed before delivery, dropping response"
            );
        } else {
            tracing::debug!(request_code = %request_code, status = ?status, "response sent");
        }
    }
}
