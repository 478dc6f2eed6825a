//! Obtains a token with client credentials and reads the current user.
//!
//! ```text
//! CARTHOOKS_CLIENT_ID=... CARTHOOKS_CLIENT_SECRET=... cargo run -p carthooks --example oauth_flow
//! ```

use anyhow::{Context, bail};
use carthooks::{Client, ClientConfig, OAuthConfig, UserInfo};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oauth_flow=info,carthooks=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client_id = std::env::var("CARTHOOKS_CLIENT_ID").context("CARTHOOKS_CLIENT_ID not set")?;
    let client_secret =
        std::env::var("CARTHOOKS_CLIENT_SECRET").context("CARTHOOKS_CLIENT_SECRET not set")?;

    let config = ClientConfig::builder()
        .oauth(OAuthConfig::new(client_id, client_secret))
        .with_env()
        .build();
    let client = Client::new(config)?;

    let token = client.initialize_oauth(None).await?;
    if !token.is_success() {
        bail!("token request failed: {token}");
    }
    if let Some(tokens) = client.current_tokens().await {
        info!(expires_at = ?tokens.expires_at, scope = ?tokens.scope, "Token issued");
    }

    let me = client.get_current_user().await;
    let user: UserInfo = me.extract_as()?;
    info!(
        user_id = user.user_id,
        tenant = %user.tenant_name,
        admin = user.is_admin,
        "Authenticated"
    );

    // Later calls refresh the token transparently once it nears expiry.
    client.ensure_fresh().await?;
    info!(freshness = ?client.freshness().await, "Done");
    Ok(())
}
