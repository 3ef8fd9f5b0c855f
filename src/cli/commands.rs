//! Commands against the shopping list demo resource.

use color_eyre::Result;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use crate::collection::SortOrder;
use crate::config::SyncConfig;
use crate::data_source::RealtimeDataSource;
use crate::models::ShoppingItem;
use crate::subscription::{SubscribeOptions, SubscriptionState};
use crate::traits::HttpClient;

/// Print every snapshot until the feed ends or Ctrl-C is pressed.
pub async fn watch<C, W>(source: &RealtimeDataSource<C>, out: &mut W) -> Result<SubscriptionState>
where
    C: HttpClient + 'static,
    W: Write,
{
    watch_until(source, out, tokio::signal::ctrl_c()).await
}

/// Print every snapshot until the feed ends or `interrupt` completes, which
/// cancels the subscription.
pub async fn watch_until<C, W, F>(
    source: &RealtimeDataSource<C>,
    out: &mut W,
    interrupt: F,
) -> Result<SubscriptionState>
where
    C: HttpClient + 'static,
    W: Write,
    F: Future,
{
    let options = SubscribeOptions::new().with_order(SortOrder::by(ShoppingItem::bought_last));
    let mut items = source.subscribe(options);
    info!("Watching {}", source.config().changes_url());

    tokio::pin!(interrupt);
    loop {
        let next = tokio::select! {
            snapshot = items.next_snapshot() => Some(snapshot),
            _ = &mut interrupt => None,
        };
        let Some(snapshot) = next else {
            items.cancel();
            break;
        };
        match snapshot {
            Some(Ok(snapshot)) => write_snapshot(out, &snapshot)?,
            Some(Err(e)) => return Err(e.into()),
            None => break,
        }
    }

    Ok(items.state())
}

/// Render one snapshot.
pub fn write_snapshot<W: Write>(out: &mut W, snapshot: &[ShoppingItem]) -> Result<()> {
    writeln!(out, "--- {} item(s) ---", snapshot.len())?;
    for item in snapshot {
        writeln!(out, "{}", item)?;
    }
    out.flush()?;
    Ok(())
}

/// Create an item with a fresh id. Returns the id.
pub async fn add<C: HttpClient + 'static>(source: &RealtimeDataSource<C>, name: &str) -> Result<String> {
    let item = ShoppingItem::new(uuid::Uuid::new_v4().to_string(), name, false);
    source.create(&item).await?;
    Ok(item.id)
}

pub async fn delete<C: HttpClient + 'static>(source: &RealtimeDataSource<C>, id: &str) -> Result<()> {
    source.delete_by_id(id).await?;
    Ok(())
}

pub async fn clear<C: HttpClient + 'static>(source: &RealtimeDataSource<C>) -> Result<()> {
    source.delete_all().await?;
    Ok(())
}

/// Configuration from the environment, with `url` taking precedence.
pub fn resolve_config(url: Option<&str>) -> SyncConfig {
    let config = SyncConfig::from_env();
    match url {
        Some(url) => config.with_resource_url(url),
        None => config,
    }
}

/// Build the production data source for `url`.
pub fn connect(url: Option<&str>) -> Result<RealtimeDataSource> {
    Ok(RealtimeDataSource::from_config(resolve_config(url))?)
}

/// A data source over an arbitrary client, for tests.
pub fn connect_with<C: HttpClient + 'static>(client: Arc<C>, url: &str) -> RealtimeDataSource<C> {
    RealtimeDataSource::with_client(client, resolve_config(Some(url)))
}
