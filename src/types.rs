//! Request and response envelopes exchanged between callers and the service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;

/// Sending half of a request's reply channel
///
/// Supplied by the caller inside the request envelope; the service delivers
/// exactly one [`DownloadReply`] through it.
pub type ReplySender = oneshot::Sender<DownloadReply>;

/// Receiving half of a request's reply channel, kept by the caller
pub type ReplyReceiver = oneshot::Receiver<DownloadReply>;

/// Caller-chosen correlation code carried in a request
///
/// Opaque to the service: it is never interpreted, only surfaced in log
/// fields so operators can match log lines to caller requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestCode(pub i32);

impl RequestCode {
    /// Create a new RequestCode
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Get the inner i32 value
    pub fn get(&self) -> i32 {
        self.0
    }
}

impl From<i32> for RequestCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<RequestCode> for i32 {
    fn from(code: RequestCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for RequestCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Outcome of a download request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The image was downloaded and stored
    Ok,
    /// The download failed; no file was stored
    Canceled,
}

impl Status {
    /// Convert integer status code to Status enum
    ///
    /// The integer values mirror the original wire shape (`-1` = ok,
    /// `0` = canceled). Unknown values decode to Canceled.
    pub fn from_i32(status: i32) -> Self {
        match status {
            -1 => Status::Ok,
            _ => Status::Canceled,
        }
    }

    /// Convert Status enum to integer status code
    pub fn to_i32(&self) -> i32 {
        match self {
            Status::Ok => -1,
            Status::Canceled => 0,
        }
    }
}

/// Request envelope: one image to download, and where to answer
///
/// Construction performs no validation; every field is carried verbatim.
/// The service consumes the envelope exactly once via [`into_parts`].
///
/// [`into_parts`]: DownloadRequest::into_parts
pub struct DownloadRequest {
    source_url: String,
    request_code: RequestCode,
    directory: PathBuf,
    reply: ReplySender,
}

impl DownloadRequest {
    /// Build a request envelope
    ///
    /// Mirrors the caller side of the exchange: pick a correlation code,
    /// create a [`oneshot`] channel, keep the receiver, and hand the sender
    /// over inside the envelope.
    pub fn new(
        source_url: impl Into<String>,
        request_code: RequestCode,
        directory: impl Into<PathBuf>,
        reply: ReplySender,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            request_code,
            directory: directory.into(),
            reply,
        }
    }

    /// The source image locator, verbatim as supplied
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The caller's correlation code
    pub fn request_code(&self) -> RequestCode {
        self.request_code
    }

    /// The destination directory for the stored file
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Decompose the envelope into its fields
    ///
    /// This is the service-side decode step; the envelope is consumed so the
    /// reply sender can only be used once.
    pub fn into_parts(self) -> (String, RequestCode, PathBuf, ReplySender) {
        (self.source_url, self.request_code, self.directory, self.reply)
    }
}

impl std::fmt::Debug for DownloadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("source_url", &self.source_url)
            .field("request_code", &self.request_code)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

/// Response envelope delivered once per request
///
/// Carries the outcome status, the echoed source locator, and — on success
/// only — the path the image was stored at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadReply {
    status: Status,
    source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_pathname: Option<PathBuf>,
}

impl DownloadReply {
    /// Build a reply from a fetch outcome
    ///
    /// `None` means the download failed: status becomes [`Status::Canceled`]
    /// and no pathname is carried. `Some(path)` yields [`Status::Ok`] with
    /// the stored path. The source locator is echoed verbatim either way.
    pub fn new(stored: Option<PathBuf>, source_url: impl Into<String>) -> Self {
        let status = if stored.is_some() {
            Status::Ok
        } else {
            Status::Canceled
        };
        Self {
            status,
            source_url: source_url.into(),
            image_pathname: stored,
        }
    }

    /// The outcome status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the download succeeded
    pub fn is_success(&self) -> bool {
        self.status == Status::Ok
    }

    /// The source locator echoed back from the request
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Where the image was stored; only present when [`status`] is Ok
    ///
    /// [`status`]: DownloadReply::status
    pub fn image_pathname(&self) -> Option<&Path> {
        self.image_pathname.as_deref()
    }
}
