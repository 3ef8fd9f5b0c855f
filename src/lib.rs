//! Realtime bindings - keep a local collection in sync with a server-side
//! collection over a streaming change feed.
//!
//! The CLI binary and the integration tests use the modules below.

pub mod adapters;
pub mod cli;
pub mod collection;
pub mod config;
pub mod data_source;
pub mod error;
pub mod gateway;
pub mod models;
pub mod sse;
pub mod subscription;
pub mod traits;

pub use data_source::RealtimeDataSource;
pub use error::{SyncError, SyncResult};
pub use subscription::{subscribe, SubscribeOptions, Subscription, SubscriptionState};
