// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth client and login handling.
//!
//! Handles:
//! - Building the authorization redirect
//! - Exchanging the authorization code for tokens
//! - Fetching the Discord profile
//! - Creating or refreshing the local user record

use crate::config::Config;
use crate::db::Store;
use crate::error::AppError;
use crate::models::{DiscordProfile, User};
use crate::time_utils::format_utc_rfc3339;
use serde::Deserialize;
use std::sync::Arc;

/// OAuth scopes requested at login.
pub const OAUTH_SCOPES: &str = "identify email";

/// Discord API client.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl DiscordClient {
    /// Create a new Discord client with OAuth credentials.
    pub fn new(
        base_url: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// URL of the Discord consent screen carrying the given `state`.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/oauth2/authorize?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/oauth2/token", self.base_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::DiscordApi(format!("Token exchange failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Get the profile of the user owning `access_token`.
    pub async fn get_current_user(&self, access_token: &str) -> Result<DiscordProfile, AppError> {
        let response = self
            .http
            .get(format!("{}/users/@me", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::DiscordApi(format!("Profile request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Discord rate limit hit (429)");
            }

            return Err(AppError::DiscordApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::DiscordApi(format!("JSON parse error: {}", e)))
    }
}

/// Token response from Discord's OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// DiscordService - login flow on top of the client and the store
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a completed login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    /// True if this login created the user record.
    pub created: bool,
}

/// Turns a Discord authorization code into a local user.
#[derive(Clone)]
pub struct DiscordService {
    client: DiscordClient,
    db: Arc<dyn Store>,
}

impl DiscordService {
    pub fn new(config: &Config, db: Arc<dyn Store>) -> Self {
        Self {
            client: DiscordClient::new(
                config.discord_api_base.clone(),
                config.discord_client_id.clone(),
                config.discord_client_secret.clone(),
                config.discord_callback_url.clone(),
            ),
            db,
        }
    }

    pub fn authorize_url(&self, state: &str) -> String {
        self.client.authorize_url(state)
    }

    /// Handle OAuth callback: exchange code, fetch profile, store user.
    pub async fn handle_oauth_callback(&self, code: &str) -> Result<LoginOutcome, AppError> {
        let tokens = self.client.exchange_code(code).await?;
        let profile = self.client.get_current_user(&tokens.access_token).await?;

        tracing::debug!(
            discord_id = %profile.id,
            scope = ?tokens.scope,
            expires_in = ?tokens.expires_in,
            "Discord profile fetched"
        );

        self.upsert_user(&profile, tokens.access_token, tokens.refresh_token)
            .await
    }

    /// Create the user on first login, otherwise refresh stored tokens.
    ///
    /// A concurrent first login for the same Discord ID loses the insert
    /// with a conflict; that case falls back to updating the winner's record.
    pub async fn upsert_user(
        &self,
        profile: &DiscordProfile,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<LoginOutcome, AppError> {
        let now = format_utc_rfc3339(chrono::Utc::now());

        if let Some(existing) = self.db.find_user_by_discord_id(&profile.id).await? {
            let user = self
                .refresh_tokens(existing, access_token, refresh_token, &now)
                .await?;
            return Ok(LoginOutcome {
                user,
                created: false,
            });
        }

        let user = User::from_profile(profile, access_token.clone(), refresh_token.clone(), &now);
        match self.db.insert_user(&user).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %user.id,
                    discord_id = %user.discord_id,
                    "New user created"
                );
                Ok(LoginOutcome {
                    user,
                    created: true,
                })
            }
            Err(AppError::Conflict(_)) => {
                tracing::info!(
                    discord_id = %profile.id,
                    "Concurrent first login detected, updating existing user"
                );
                let existing = self
                    .db
                    .find_user_by_discord_id(&profile.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Database(format!(
                            "User {} conflicted on insert but cannot be read",
                            profile.id
                        ))
                    })?;
                let user = self
                    .refresh_tokens(existing, access_token, refresh_token, &now)
                    .await?;
                Ok(LoginOutcome {
                    user,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_tokens(
        &self,
        mut user: User,
        access_token: String,
        refresh_token: Option<String>,
        now: &str,
    ) -> Result<User, AppError> {
        user.access_token = access_token;
        user.refresh_token = refresh_token;
        user.updated_at = now.to_string();
        self.db.update_user(&user).await?;

        tracing::info!(user_id = %user.id, "Stored refreshed Discord tokens");
        Ok(user)
    }
}
