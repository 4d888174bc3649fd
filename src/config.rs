// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Default Discord REST API base URL.
pub const DISCORD_API_BASE: &str = "https://discord.com/api";

/// Where application data is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// In-process store, lost on restart.
    Memory,
    /// Google Cloud Firestore in the given project.
    Firestore { project_id: String },
}

impl StoreUrl {
    /// Parse a store connection string (`memory://` or `firestore://<project>`).
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw == "memory" || raw == "memory://" {
            return Ok(StoreUrl::Memory);
        }
        match raw.strip_prefix("firestore://") {
            Some(project) if !project.is_empty() && !project.contains('/') => {
                Ok(StoreUrl::Firestore {
                    project_id: project.to_string(),
                })
            }
            _ => Err(ConfigError::Invalid {
                var: "STORE_URL",
                reason: format!("unsupported store URL '{}'", raw),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Discord OAuth client ID (public)
    pub discord_client_id: String,
    /// OAuth redirect URI registered with Discord
    pub discord_callback_url: String,
    /// Discord REST API base URL (overridable for tests)
    pub discord_api_base: String,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Directory holding the single-page UI
    pub static_dir: String,
    /// Store connection string
    pub store_url: StoreUrl,
    /// Discord IDs allowed to create products. Empty means anyone may.
    pub product_admin_ids: Vec<String>,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Discord OAuth client secret
    pub discord_client_secret: String,
    /// Key for signing session tokens and OAuth state (raw bytes)
    pub session_secret: Vec<u8>,
}

impl Config {
    /// Config for testing only.
    pub fn test_default() -> Self {
        Self {
            discord_client_id: "test_client_id".to_string(),
            discord_callback_url: "http://localhost:3000/auth/discord/callback".to_string(),
            discord_api_base: DISCORD_API_BASE.to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            static_dir: "public".to_string(),
            store_url: StoreUrl::Memory,
            product_admin_ids: Vec::new(),
            port: 3000,
            discord_client_secret: "test_secret".to_string(),
            session_secret: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("'{}' is not a valid port", raw),
            })?,
            Err(_) => 3000,
        };

        Ok(Self {
            discord_client_id: required("DISCORD_CLIENT_ID")?,
            discord_callback_url: required("DISCORD_CALLBACK_URL")?,
            discord_api_base: env::var("DISCORD_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DISCORD_API_BASE.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            store_url: match env::var("STORE_URL") {
                Ok(raw) => StoreUrl::parse(&raw)?,
                Err(_) => StoreUrl::Memory,
            },
            product_admin_ids: env::var("PRODUCT_ADMIN_IDS")
                .map(|raw| parse_id_list(&raw))
                .unwrap_or_default(),
            port,

            discord_client_secret: required("DISCORD_CLIENT_SECRET")?,
            session_secret: required("SESSION_SECRET")?.into_bytes(),
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.discord_callback_url.starts_with("https://")
    }

    /// Whether product creation is restricted to configured admins.
    pub fn product_creation_restricted(&self) -> bool {
        !self.product_admin_ids.is_empty()
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
