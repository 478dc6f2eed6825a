//! Lists and updates items with a static access token.
//!
//! ```text
//! CARTHOOKS_ACCESS_TOKEN=... cargo run -p carthooks --example basic_usage -- <app_id> <collection_id>
//! ```

use anyhow::{Context, bail};
use carthooks::{Client, LockOptions};
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basic_usage=info,carthooks=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let app_id: u64 = args.next().context("missing app id")?.parse()?;
    let collection_id: u64 = args.next().context("missing collection id")?.parse()?;

    let client = Client::from_env()?;
    info!(base_url = client.base_url(), "Connected");

    let items = client.get_items(app_id, collection_id, 20, 0, &[]).await;
    if !items.is_success() {
        bail!("listing items failed: {items}");
    }
    let records = items.extract_records()?;
    if let Some(pagination) = items.extract_pagination()? {
        info!(total = pagination.total, page = pagination.page, "Listed items");
    }

    let Some(first) = records.first() else {
        info!("Collection is empty");
        return Ok(());
    };

    let lock = LockOptions {
        timeout: Some(60),
        lock_id: Some("basic-usage".to_string()),
        subject: Some("example".to_string()),
    };
    let locked = client.lock_item(app_id, collection_id, first.id, &lock).await;
    if !locked.is_success() {
        warn!(trace_id = ?locked.trace_id(), "Lock failed: {locked}");
        return Ok(());
    }

    let mut data = Map::new();
    data.insert("title".to_string(), Value::from(format!("{} (touched)", first.title)));
    let updated = client
        .update_item(app_id, collection_id, first.id, &data)
        .await;
    info!(id = first.id, success = updated.is_success(), "Updated item");

    client
        .unlock_item(app_id, collection_id, first.id, "basic-usage")
        .await;
    Ok(())
}
