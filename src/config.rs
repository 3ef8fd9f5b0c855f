//! Sync configuration.
//!
//! Use the builder pattern to customize how a data source talks to its
//! resource.
//!
//! # Example
//!
//! ```
//! use realtime_bindings::config::SyncConfig;
//! use std::time::Duration;
//!
//! let config = SyncConfig::new("http://localhost:8081/shoppingItem")
//!     .with_connect_timeout(Duration::from_secs(5))
//!     .with_header("Authorization", "Bearer token");
//! assert_eq!(config.changes_url(), "http://localhost:8081/shoppingItem/changes");
//! ```

use std::time::Duration;

use crate::traits::Headers;

/// Environment variable holding the resource URL.
pub const ENV_RESOURCE_URL: &str = "REALTIME_RESOURCE_URL";
/// Environment variable holding the connect timeout in seconds.
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "REALTIME_CONNECT_TIMEOUT_SECS";
/// Environment variable holding the per-write timeout in seconds.
pub const ENV_WRITE_TIMEOUT_SECS: &str = "REALTIME_WRITE_TIMEOUT_SECS";

/// Default resource URL, matching the demo server.
pub const DEFAULT_RESOURCE_URL: &str = "http://localhost:8081/shoppingItem";
/// Path appended to the resource URL to reach the change feed.
pub const DEFAULT_CHANGES_SUFFIX: &str = "/changes";
/// Snapshots buffered between the stream task and a slow consumer.
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 64;

/// Configuration for a realtime data source.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Resource URL writes go to (`POST`, `DELETE`, `DELETE /{id}`)
    pub resource_url: String,
    /// Suffix appended to `resource_url` for the change feed
    pub changes_suffix: String,
    /// Extra headers sent with every request
    pub headers: Headers,
    /// Timeout for establishing a connection. The stream itself never times out.
    pub connect_timeout: Option<Duration>,
    /// Timeout applied to each write round trip
    pub write_timeout: Option<Duration>,
    /// Capacity of the snapshot channel handed to consumers
    pub snapshot_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resource_url: DEFAULT_RESOURCE_URL.to_string(),
            changes_suffix: DEFAULT_CHANGES_SUFFIX.to_string(),
            headers: Headers::new(),
            connect_timeout: None,
            write_timeout: None,
            snapshot_capacity: DEFAULT_SNAPSHOT_CAPACITY,
        }
    }
}

impl SyncConfig {
    /// Create a config for the given resource URL.
    pub fn new(resource_url: impl Into<String>) -> Self {
        Self::default().with_resource_url(resource_url)
    }

    /// Set the resource URL. A trailing slash is dropped.
    pub fn with_resource_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.resource_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the change feed suffix.
    pub fn with_changes_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.changes_suffix = suffix.into();
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the per-write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Set the snapshot channel capacity (minimum 1).
    pub fn with_snapshot_capacity(mut self, capacity: usize) -> Self {
        self.snapshot_capacity = capacity.max(1);
        self
    }

    /// URL of the change feed.
    pub fn changes_url(&self) -> String {
        format!("{}{}", self.resource_url, self.changes_suffix)
    }

    /// URL of a single element.
    pub fn element_url(&self, id: &str) -> String {
        format!("{}/{}", self.resource_url, id)
    }

    /// Create config from environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_RESOURCE_URL) {
            if !url.trim().is_empty() {
                config = config.with_resource_url(url.trim());
            }
        }
        if let Some(secs) = env_secs(ENV_CONNECT_TIMEOUT_SECS) {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = env_secs(ENV_WRITE_TIMEOUT_SECS) {
            config = config.with_write_timeout(Duration::from_secs(secs));
        }

        config
    }
}

fn env_secs(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}
