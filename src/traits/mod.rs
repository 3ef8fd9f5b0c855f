//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (streaming GET, POST, DELETE)

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
