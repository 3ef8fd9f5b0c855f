//! Error category classification.
//!
//! Categories give consumers a coarse handle on failures so they can decide
//! whether to resubscribe or resend. Nothing in this crate retries on its own.

use std::fmt;

/// High-level categorization of sync errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection-level failures (refused, reset, timeout, cancelled).
    /// Generally transient.
    Network,

    /// The server answered a write with a non-2xx status.
    /// Transient for 5xx, permanent for most 4xx.
    Server,

    /// The change feed delivered bytes or payloads we could not understand.
    /// Fatal to the subscription that received them.
    Protocol,

    /// Misuse on our side (value not serializable, parser used after close).
    Client,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Client => "client",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Server => "Server rejected the request",
            ErrorCategory::Protocol => "Unreadable change feed",
            ErrorCategory::Client => "Application error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
