use std::sync::Arc;

use anyhow::Context;

use makechange_api::app::{build_app, services};
use makechange_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    makechange_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    if config.auth.insecure_default {
        tracing::warn!("FUSIONAUTH_CLIENT_SECRET not set; using insecure dev default");
    }

    let jwt = services::build_validator(&config.auth);
    let app_services = services::build_services(&config)?;
    let app = build_app(jwt, Arc::new(app_services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
