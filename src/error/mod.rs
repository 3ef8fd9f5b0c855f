//! Error handling for the change feed and the write gateway.
//!
//! - **Error Categories**: coarse classification for consumer decisions
//! - **Unified Error Type**: `SyncError` is the single taxonomy
//! - **Result Type Alias**: `SyncResult<T>`
//!
//! | Variant | Raised by | Fatal to subscription |
//! |---------|-----------|-----------------------|
//! | Decode | frame parser | yes |
//! | MalformedEnvelope | envelope decoder | yes |
//! | Transport | stream or write | yes (stream) / caller only (write) |
//! | HttpStatus | write | no |

mod category;
mod sync_error;

pub use category::ErrorCategory;
pub use sync_error::SyncError;

/// Type alias for Results using SyncError.
pub type SyncResult<T> = Result<T, SyncError>;
