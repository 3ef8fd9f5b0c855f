//! Writes against the remote resource.
//!
//! Three operations, one round trip each and never retried:
//! - `POST <resource>` with the JSON-encoded record (create)
//! - `DELETE <resource>/<id>` (delete one)
//! - `DELETE <resource>` (delete all)
//!
//! Any 2xx status is success. Other statuses fail with
//! [`SyncError::HttpStatus`] carrying the body as text.

mod handle;

pub use handle::WriteHandle;

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::models::encode_value;
use crate::traits::{Headers, HttpClient, Response};

const CONTENT_TYPE: &str = "Content-Type";

/// Client for the write side of a resource.
pub struct WriteGateway<C: HttpClient> {
    client: Arc<C>,
    config: Arc<SyncConfig>,
}

impl<C: HttpClient> Clone for WriteGateway<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: HttpClient + 'static> WriteGateway<C> {
    pub fn new(client: Arc<C>, config: SyncConfig) -> Self {
        Self::with_shared_config(client, Arc::new(config))
    }

    pub(crate) fn with_shared_config(client: Arc<C>, config: Arc<SyncConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Create (or upsert) a record.
    pub async fn create<T: Serialize + ?Sized>(&self, value: &T) -> SyncResult<()> {
        let body = encode_value(value)?;
        self.post_body(body).await
    }

    /// Delete the record with the given identity.
    pub async fn delete_by_id(&self, id: &str) -> SyncResult<()> {
        let url = self.config.element_url(id);
        self.send_delete(url).await
    }

    /// Delete every record of the resource.
    pub async fn delete_all(&self) -> SyncResult<()> {
        let url = self.config.resource_url.clone();
        self.send_delete(url).await
    }

    /// Run [`create`](Self::create) in its own task.
    ///
    /// The value is encoded before the task starts, so encoding errors
    /// surface from the handle's outcome without any request being made.
    pub fn spawn_create<T: Serialize + ?Sized>(&self, value: &T) -> WriteHandle {
        let encoded = encode_value(value);
        let gateway = self.clone();
        WriteHandle::new(tokio::spawn(async move {
            match encoded {
                Ok(body) => gateway.post_body(body).await,
                Err(e) => Err(e),
            }
        }))
    }

    /// Run [`delete_by_id`](Self::delete_by_id) in its own task.
    pub fn spawn_delete_by_id(&self, id: impl Into<String>) -> WriteHandle {
        let id = id.into();
        let gateway = self.clone();
        WriteHandle::new(tokio::spawn(async move { gateway.delete_by_id(&id).await }))
    }

    /// Run [`delete_all`](Self::delete_all) in its own task.
    pub fn spawn_delete_all(&self) -> WriteHandle {
        let gateway = self.clone();
        WriteHandle::new(tokio::spawn(async move { gateway.delete_all().await }))
    }

    pub(crate) async fn post_body(&self, body: String) -> SyncResult<()> {
        let url = &self.config.resource_url;
        let mut headers = self.config.headers.clone();
        headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE));
        headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());

        debug!("POST {} ({} bytes)", url, body.len());
        let response = self.client.post(url, &body, &headers).await.map_err(|e| {
            warn!("POST {} failed: {}", url, e);
            SyncError::Transport(e)
        })?;
        check_status("POST", url, response)
    }

    async fn send_delete(&self, url: String) -> SyncResult<()> {
        let headers: &Headers = &self.config.headers;

        debug!("DELETE {}", url);
        let response = self.client.delete(&url, headers).await.map_err(|e| {
            warn!("DELETE {} failed: {}", url, e);
            SyncError::Transport(e)
        })?;
        check_status("DELETE", &url, response)
    }
}

fn check_status(method: &str, url: &str, response: Response) -> SyncResult<()> {
    if response.is_success() {
        debug!("{} {} -> {}", method, url, response.status);
        return Ok(());
    }
    let body = response.text_or_empty();
    warn!("{} {} -> {}: {}", method, url, response.status, body);
    Err(SyncError::HttpStatus {
        status: response.status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::models::ShoppingItem;
    use crate::traits::HttpError;
    use std::time::Duration;

    const URL: &str = "http://test/items";

    fn gateway(client: &Arc<MockHttpClient>) -> WriteGateway<MockHttpClient> {
        WriteGateway::new(
            Arc::clone(client),
            SyncConfig::new(URL).with_header("X-Test", "1"),
        )
    }

    #[tokio::test]
    async fn test_create_posts_json() {
        let client = Arc::new(MockHttpClient::new());
        client.set_method_response("POST", URL, MockResponse::status(201, ""));

        let item = ShoppingItem::new("1", "Milk", false);
        gateway(&client).create(&item).await.unwrap();

        let requests = client.requests_with_method("POST");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, URL);
        assert_eq!(
            requests[0].headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(requests[0].headers.get("X-Test"), Some(&"1".to_string()));
        let sent: ShoppingItem =
            serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, item);
    }

    #[tokio::test]
    async fn test_configured_content_type_is_replaced() {
        let client = Arc::new(MockHttpClient::new());
        client.set_method_response("POST", URL, MockResponse::status(201, ""));
        let gateway = WriteGateway::new(
            Arc::clone(&client),
            SyncConfig::new(URL).with_header("content-type", "text/plain"),
        );

        gateway.create(&ShoppingItem::new("1", "Milk", false)).await.unwrap();

        let headers = &client.requests_with_method("POST")[0].headers;
        let content_types: Vec<_> = headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(
            headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_by_id_url() {
        let client = Arc::new(MockHttpClient::new());
        client.set_default_response(MockResponse::status(204, ""));

        gateway(&client).delete_by_id("abc").await.unwrap();
        let requests = client.requests_with_method("DELETE");
        assert_eq!(requests[0].url, "http://test/items/abc");
    }

    #[tokio::test]
    async fn test_delete_all_url() {
        let client = Arc::new(MockHttpClient::new());
        client.set_default_response(MockResponse::status(200, "{}"));

        gateway(&client).delete_all().await.unwrap();
        let requests = client.requests_with_method("DELETE");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, URL);
    }

    #[tokio::test]
    async fn test_non_2xx_is_http_status() {
        let client = Arc::new(MockHttpClient::new());
        client.set_default_response(MockResponse::status(409, "conflict"));

        let err = gateway(&client).delete_by_id("1").await.unwrap_err();
        assert_eq!(
            err,
            SyncError::HttpStatus {
                status: 409,
                body: "conflict".to_string()
            }
        );
        assert!(!err.is_fatal_to_subscription());
    }

    #[tokio::test]
    async fn test_3xx_is_failure() {
        let client = Arc::new(MockHttpClient::new());
        client.set_default_response(MockResponse::status(304, ""));
        let err = gateway(&client).delete_all().await.unwrap_err();
        assert!(matches!(err, SyncError::HttpStatus { status: 304, .. }));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = Arc::new(MockHttpClient::new());
        client.set_default_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));

        let err = gateway(&client)
            .create(&ShoppingItem::new("1", "a", false))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SyncError::Transport(HttpError::ConnectionFailed("refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_spawned_write_outcome() {
        let client = Arc::new(MockHttpClient::new());
        client.set_default_response(MockResponse::status(500, "boom"));

        let handle = gateway(&client).spawn_delete_by_id("7");
        let err = handle.outcome().await.unwrap_err();
        assert!(matches!(err, SyncError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_write() {
        let client = Arc::new(MockHttpClient::new());
        client.set_default_response(MockResponse::Delayed(
            Duration::from_secs(60),
            Box::new(MockResponse::status(200, "")),
        ));

        let handle = gateway(&client).spawn_delete_all();
        tokio::task::yield_now().await;
        handle.cancel();
        assert_eq!(
            handle.outcome().await,
            Err(SyncError::Transport(HttpError::Cancelled))
        );
    }
}
