//! Realtime data source bound to one remote resource.
//!
//! The resource URL serves writes; its change feed lives at
//! `<resource>/changes` (configurable through [`SyncConfig`]).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::gateway::WriteGateway;
use crate::models::Identifiable;
use crate::subscription::{SubscribeOptions, Subscription};
use crate::traits::HttpClient;

/// Subscribe to and write to one remote collection.
///
/// # Example
///
/// ```ignore
/// use realtime_bindings::{RealtimeDataSource, SubscribeOptions};
/// use realtime_bindings::models::ShoppingItem;
///
/// let source = RealtimeDataSource::new("http://localhost:8081/shoppingItem")?;
/// let mut items = source.subscribe(SubscribeOptions::<ShoppingItem>::new());
/// while let Some(snapshot) = items.next_snapshot().await {
///     println!("{:?}", snapshot?);
/// }
/// ```
pub struct RealtimeDataSource<C: HttpClient + 'static = ReqwestHttpClient> {
    client: Arc<C>,
    config: Arc<SyncConfig>,
    gateway: WriteGateway<C>,
}

impl RealtimeDataSource<ReqwestHttpClient> {
    /// A data source for `resource_url` with default settings.
    pub fn new(resource_url: impl Into<String>) -> SyncResult<Self> {
        Self::from_config(SyncConfig::new(resource_url))
    }

    /// A data source using a reqwest client built from `config`.
    pub fn from_config(config: SyncConfig) -> SyncResult<Self> {
        let client = ReqwestHttpClient::from_config(&config).map_err(SyncError::Transport)?;
        Ok(Self::with_client(Arc::new(client), config))
    }
}

impl<C: HttpClient + 'static> RealtimeDataSource<C> {
    pub fn with_client(client: Arc<C>, config: SyncConfig) -> Self {
        let config = Arc::new(config);
        let gateway = WriteGateway::with_shared_config(Arc::clone(&client), Arc::clone(&config));
        debug!("Data source for {}", config.resource_url);
        Self {
            client,
            config,
            gateway,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn gateway(&self) -> &WriteGateway<C> {
        &self.gateway
    }

    /// Start a subscription to the change feed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<T, V>(&self, options: SubscribeOptions<T, V>) -> Subscription<T, C, V>
    where
        T: Identifiable + Clone + DeserializeOwned + Serialize + Send + Sync + 'static,
        V: Identifiable + Clone + Send + 'static,
    {
        Subscription::start(Arc::clone(&self.client), Arc::clone(&self.config), options)
    }

    /// Create (or upsert) a record.
    pub async fn create<T: Serialize + ?Sized>(&self, value: &T) -> SyncResult<()> {
        self.gateway.create(value).await
    }

    pub async fn delete_by_id(&self, id: &str) -> SyncResult<()> {
        self.gateway.delete_by_id(id).await
    }

    pub async fn delete_all(&self) -> SyncResult<()> {
        self.gateway.delete_all().await
    }
}
