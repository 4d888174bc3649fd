// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord Shop API Server
//!
//! Serves Discord login, the product catalog, purchase recording and the
//! single-page UI.

use discord_shop::{config::Config, db, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Discord Shop API");

    if config.product_creation_restricted() {
        tracing::info!(
            admins = config.product_admin_ids.len(),
            "Product creation restricted to configured admins"
        );
    } else {
        tracing::warn!("PRODUCT_ADMIN_IDS is empty: anyone can create products");
    }

    // Connect to the store
    let store = db::connect(&config.store_url).await?;
    tracing::info!(store = ?config.store_url, "Store ready");

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store));

    // Build router
    let app = discord_shop::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("discord_shop=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
