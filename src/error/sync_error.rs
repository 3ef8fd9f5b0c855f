//! Unified error type for subscriptions and writes.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Every failure the change feed or the write gateway can report.
///
/// `Decode` and `MalformedEnvelope` only come out of a subscription and end
/// it. `HttpStatus` only comes out of a write and never touches the
/// subscription. `Transport` can come out of either.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// The accumulated stream buffer is not valid UTF-8.
    #[error("change feed is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Decode { valid_up_to: usize },

    /// A frame payload is not a `{value, event}` envelope.
    #[error("malformed change envelope: {message}")]
    MalformedEnvelope { payload: String, message: String },

    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(HttpError),

    /// Non-2xx response to a write.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A value could not be serialized into a write body.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// Bytes were fed to a frame parser after `complete()` or `fail()`.
    #[error("frame parser already closed")]
    ParserClosed,
}

impl SyncError {
    /// Build a `MalformedEnvelope` error, keeping the offending payload.
    pub fn malformed(payload: &str, message: impl Into<String>) -> Self {
        SyncError::MalformedEnvelope {
            payload: payload.to_string(),
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::Decode { .. } | SyncError::MalformedEnvelope { .. } => {
                ErrorCategory::Protocol
            }
            SyncError::Transport(_) => ErrorCategory::Network,
            SyncError::HttpStatus { .. } => ErrorCategory::Server,
            SyncError::Encode(_) | SyncError::ParserClosed => ErrorCategory::Client,
        }
    }

    /// Whether resending the same request may succeed.
    ///
    /// Only a hint for the consumer; the crate never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport(HttpError::Cancelled) => false,
            SyncError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            other => other.category().is_retryable(),
        }
    }

    /// Whether this error ends the subscription that observed it.
    pub fn is_fatal_to_subscription(&self) -> bool {
        !matches!(self, SyncError::HttpStatus { .. } | SyncError::Encode(_))
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Decode { .. } => "E_SYNC_DECODE",
            SyncError::MalformedEnvelope { .. } => "E_SYNC_ENVELOPE",
            SyncError::Transport(_) => "E_SYNC_TRANSPORT",
            SyncError::HttpStatus { .. } => "E_SYNC_HTTP",
            SyncError::Encode(_) => "E_SYNC_ENCODE",
            SyncError::ParserClosed => "E_SYNC_CLOSED",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Decode { .. } | SyncError::MalformedEnvelope { .. } => {
                "The server sent data that could not be read. Live updates have stopped.".to_string()
            }
            SyncError::Transport(HttpError::Cancelled) => "The request was cancelled.".to_string(),
            SyncError::Transport(_) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            SyncError::HttpStatus { status, body } => match *status {
                400 => format!("The server rejected the change: {}", body),
                404 => "The item no longer exists on the server.".to_string(),
                500..=599 => "The server is experiencing issues. Please try again later.".to_string(),
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            SyncError::Encode(_) | SyncError::ParserClosed => {
                "An internal error occurred.".to_string()
            }
        }
    }
}

impl From<HttpError> for SyncError {
    fn from(err: HttpError) -> Self {
        SyncError::Transport(err)
    }
}
