//! The download-to-file collaborator
//!
//! [`ImageFetcher`] is the seam between the service loop and the actual byte
//! moving: given a source URL and a destination directory, produce the stored
//! file's path or an explicit error. [`HttpImageFetcher`] is the production
//! implementation; tests and embedders can plug in their own.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::{Config, FileCollisionAction};
use crate::error::{Error, FetchError, Result};
use crate::utils;

/// Downloads one image into a directory and returns the stored path
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch `url` and store the body under `directory`
    ///
    /// Returns the path the image was written to. Implementations report
    /// *why* a fetch failed; the service collapses the reason into a plain
    /// failure reply and keeps it for the log.
    async fn fetch(&self, url: &str, directory: &Path) -> std::result::Result<PathBuf, FetchError>;

    /// Name of the fetcher implementation, for startup logging
    fn name(&self) -> &'static str;
}

/// HTTP fetcher backed by a shared [`reqwest::Client`]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    collision: FileCollisionAction,
}

impl HttpImageFetcher {
    /// Build a fetcher from the service configuration
    ///
    /// The client carries the configured timeout and user agent; both apply
    /// to every request made through this fetcher.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Fetch(FetchError::Request(e)))?;

        Ok(Self {
            client,
            collision: config.file_collision,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, directory: &Path) -> std::result::Result<PathBuf, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus { status });
        }

        // A server that answers with HTML (login page, error page) is a
        // failed download, not a stored image. Absent header: benefit of
        // the doubt.
        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE)
            && let Ok(value) = content_type.to_str()
            && !value.trim().to_ascii_lowercase().starts_with("image/")
        {
            return Err(FetchError::NotAnImage {
                content_type: value.to_string(),
            });
        }

        // Filename must be derived before the response is consumed for its body.
        let filename = utils::filename_from_response(&response, url);
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(directory).await?;
        let destination = utils::unique_destination(&directory.join(filename), self.collision)?;
        tokio::fs::write(&destination, &bytes).await?;

        tracing::debug!(
            url = %url,
            destination = %destination.display(),
            size_bytes = bytes.len(),
            "image stored"
        );

        Ok(destination)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
