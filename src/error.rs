//! Error types for image-dl
//!
//! Two layers of errors exist:
//! - [`Error`] — the crate-level error returned from the public service API
//! - [`FetchError`] — everything that can go wrong while downloading one image
//!
//! Fetch failures never reach the caller as errors: the dispatch loop
//! collapses them into a `Canceled` reply and logs the reason service-side.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for image-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "queue_capacity")
        key: Option<String>,
    },

    /// Image fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new requests
    #[error("shutdown in progress: not accepting new requests")]
    ShuttingDown,
}

/// Errors produced while downloading a single image to a file
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source locator could not be parsed as a URL
    #[error("invalid source URL: {url}")]
    InvalidUrl {
        /// The offending locator, verbatim
        url: String,
    },

    /// The HTTP request itself failed (connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned status {status}")]
    HttpStatus {
        /// The HTTP status code the server returned
        status: reqwest::StatusCode,
    },

    /// The response body is not an image
    #[error("response is not an image (content-type {content_type})")]
    NotAnImage {
        /// The Content-Type header value the server sent
        content_type: String,
    },

    /// The destination file exists and the collision action forbids replacing it
    #[error("destination already exists: {path}")]
    Collision {
        /// The path that was already occupied
        path: PathBuf,
    },

    /// Writing the image to local storage failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
