// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord Shop: Discord login and a minimal product purchase flow
//!
//! This crate provides the backend API: Discord OAuth sign-in with a signed
//! session cookie, a product catalog, and purchase recording.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::DiscordService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub discord_service: DiscordService,
}

impl AppState {
    /// Build state from configuration and an already-connected store.
    pub fn new(config: Config, db: Arc<dyn Store>) -> Self {
        let discord_service = DiscordService::new(&config, db.clone());
        Self {
            config,
            db,
            discord_service,
        }
    }
}
