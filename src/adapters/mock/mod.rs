//! Mock implementations for testing.
//!
//! Test doubles for the trait abstractions, enabling unit and integration
//! tests without network access.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted responses and streams

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
