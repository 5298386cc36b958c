//! Configuration types for image-dl

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Service configuration
///
/// Everything request-specific (source URL, destination directory) travels in
/// the request envelope; `Config` only covers service-wide behavior. All
/// fields have sensible defaults, so `Config::default()` works out of the box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of requests waiting in the service queue (default: 64)
    ///
    /// Submitting while the queue is full awaits capacity rather than failing.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Per-request HTTP timeout (default: 30 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_secs")]
    pub fetch_timeout: Duration,

    /// User-Agent header sent with every fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How to handle a destination filename that already exists
    #[serde(default)]
    pub file_collision: FileCollisionAction,

    /// How long `shutdown()` waits for the worker to drain (default: 30 seconds)
    #[serde(default = "default_shutdown_grace", with = "duration_secs")]
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            fetch_timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
            file_collision: FileCollisionAction::default(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

impl Config {
    /// Validate settings that have no usable degenerate value
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.queue_capacity == 0 {
            return Err(crate::error::Error::Config {
                message: "queue_capacity must be at least 1".to_string(),
                key: Some("queue_capacity".to_string()),
            });
        }
        Ok(())
    }
}

/// File collision handling when the derived destination path already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCollisionAction {
    /// Add a " (n)" suffix until the name is free
    #[default]
    Rename,
    /// Replace the existing file
    Overwrite,
    /// Fail the download instead of touching the existing file
    Skip,
}

fn default_queue_capacity() -> usize {
    64
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("image-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper (seconds as u64)
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn zero_queue_capacity_fails_validation() {
        let config = Config {
            queue_capacity: 0,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        match err {
            crate::error::Error::Config { key, .. } => {
                assert_eq!(
                    key.as_deref(),
                    Some("queue_capacity"),
                    "error should name the offending key"
                );
            }
            other => panic!("expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn config_deserializes_from_empty_object_with_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.file_collision, FileCollisionAction::Rename);
    }

    #[test]
    fn durations_round_trip_as_seconds() {
        let config = Config {
            fetch_timeout: Duration::from_secs(5),
            shutdown_grace: Duration::from_secs(7),
            ..Default::default()
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["fetch_timeout"], 5, "durations serialize as seconds");

        let back: Config = serde_json::from_value(json).unwrap();
        assert_eq!(back.fetch_timeout, Duration::from_secs(5));
        assert_eq!(back.shutdown_grace, Duration::from_secs(7));
    }

    #[test]
    fn collision_action_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&FileCollisionAction::Overwrite).unwrap(),
            "\"overwrite\""
        );
        let action: FileCollisionAction = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(action, FileCollisionAction::Skip);
    }
}
