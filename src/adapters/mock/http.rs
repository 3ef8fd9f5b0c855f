//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that returns scripted responses
//! and records every request, so the gateway and the orchestrator can be
//! exercised without a network.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method (GET, POST or DELETE)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a buffered response
    Success(Response),
    /// Fail the request at the transport level
    Error(HttpError),
    /// Stream these chunks, then close cleanly
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail with the error
    StreamThenError(Vec<Bytes>, HttpError),
    /// Stream these chunks, then stay open until dropped
    OpenStream(Vec<Bytes>),
    /// Wait before producing the inner response
    Delayed(Duration, Box<MockResponse>),
}

impl MockResponse {
    /// Shorthand for a buffered response with a text body.
    pub fn status(status: u16, body: &str) -> Self {
        MockResponse::Success(Response::new(status, Bytes::from(body.to_string())))
    }

    /// Shorthand for a stream of UTF-8 chunks that closes cleanly.
    pub fn text_stream<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(
            chunks
                .into_iter()
                .map(|c| Bytes::from(c.into()))
                .collect(),
        )
    }
}

/// Decrements the open-stream counter when the stream holding it is dropped.
struct OpenStreamGuard(Arc<AtomicUsize>);

impl OpenStreamGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for OpenStreamGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock HTTP client for testing.
///
/// Responses are looked up by method and exact URL first, then by exact URL
/// for any method, then by the longest matching URL prefix, then the default.
///
/// # Example
///
/// ```ignore
/// use realtime_bindings::adapters::mock::{MockHttpClient, MockResponse};
/// use realtime_bindings::traits::{Headers, HttpClient};
///
/// let client = MockHttpClient::new();
/// client.set_method_response("DELETE", "http://x/items", MockResponse::status(204, ""));
///
/// let response = client.delete("http://x/items", &Headers::new()).await?;
/// assert_eq!(response.status, 204);
/// assert_eq!(client.get_requests()[0].method, "DELETE");
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses keyed by URL
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Configured responses keyed by (method, URL)
    method_responses: Arc<Mutex<HashMap<(String, String), MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Streams handed out and not yet dropped
    open_streams: Arc<AtomicUsize>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            method_responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set a response for a URL, for any method.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a response for one method on one URL.
    pub fn set_method_response(&self, method: &str, url: &str, response: MockResponse) {
        let mut responses = self.method_responses.lock().unwrap();
        responses.insert((method.to_string(), url.to_string()), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests with the given method.
    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.get_requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Number of response streams currently held open by callers.
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    /// Record a request.
    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    /// Get the response for a request.
    fn get_response(&self, method: &str, url: &str) -> Option<MockResponse> {
        {
            let by_method = self.method_responses.lock().unwrap();
            if let Some(response) = by_method.get(&(method.to_string(), url.to_string())) {
                return Some(response.clone());
            }
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        let prefix_match = responses
            .iter()
            .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, response)| response.clone());
        if prefix_match.is_some() {
            return prefix_match;
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }

    /// Resolve a scripted response for a buffered (non-stream) request.
    async fn respond(&self, method: &str, url: &str) -> Result<Response, HttpError> {
        let mut scripted = self.get_response(method, url);
        loop {
            match scripted {
                Some(MockResponse::Delayed(delay, inner)) => {
                    tokio::time::sleep(delay).await;
                    scripted = Some(*inner);
                }
                Some(MockResponse::Success(response)) => return Ok(response),
                Some(MockResponse::Error(err)) => return Err(err),
                Some(_) => {
                    return Err(HttpError::Other(
                        "Stream response on non-stream request".to_string(),
                    ))
                }
                None => return Err(HttpError::Other(format!("No mock response for URL: {}", url))),
            }
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request("GET", url, headers, None);

        let mut scripted = self.get_response("GET", url);
        loop {
            let guard = OpenStreamGuard::new(&self.open_streams);
            let stream: ByteStream = match scripted {
                Some(MockResponse::Delayed(delay, inner)) => {
                    drop(guard);
                    tokio::time::sleep(delay).await;
                    scripted = Some(*inner);
                    continue;
                }
                Some(MockResponse::Stream(chunks)) => {
                    Box::pin(futures::stream::iter(chunks.into_iter().map(Ok::<Bytes, HttpError>)))
                }
                Some(MockResponse::StreamThenError(chunks, err)) => Box::pin(
                    futures::stream::iter(chunks.into_iter().map(Ok::<Bytes, HttpError>))
                        .chain(futures::stream::once(async move { Err(err) })),
                ),
                Some(MockResponse::OpenStream(chunks)) => Box::pin(
                    futures::stream::iter(chunks.into_iter().map(Ok::<Bytes, HttpError>))
                        .chain(futures::stream::pending()),
                ),
                Some(MockResponse::Success(response)) => {
                    if !response.is_success() {
                        return Err(HttpError::ServerError {
                            status: response.status,
                            message: response.text_or_empty(),
                        });
                    }
                    Box::pin(futures::stream::iter(vec![Ok::<Bytes, HttpError>(response.body)]))
                }
                Some(MockResponse::Error(err)) => return Err(err),
                None => {
                    return Err(HttpError::Other(format!("No mock response for URL: {}", url)))
                }
            };

            let stream = stream.map(move |item| {
                let _held = &guard;
                item
            });
            return Ok(Box::pin(stream));
        }
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.respond("POST", url).await
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("DELETE", url, headers, None);
        self.respond("DELETE", url).await
    }
}
