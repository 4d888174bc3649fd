// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::Form,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use discord_shop::config::Config;
use discord_shop::db::{FirestoreDb, MemoryDb, Store};
use discord_shop::middleware::auth::create_session_token;
use discord_shop::models::{DiscordProfile, User};
use discord_shop::routes::create_router;
use discord_shop::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test harness: the router plus handles to inspect state afterwards.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub db: Arc<MemoryDb>,
}

#[allow(dead_code)]
impl TestApp {
    /// Send a request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// `Cookie` header value carrying a valid session for `user`.
    pub fn session_for(&self, user: &User) -> String {
        let token = create_session_token(&user.id, &self.state.config.session_secret).unwrap();
        format!("session={}", token)
    }
}

/// Create a test app backed by the in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app with a custom configuration.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let db = Arc::new(MemoryDb::new());
    let state = Arc::new(AppState::new(config, db.clone()));
    TestApp {
        router: create_router(state.clone()),
        state,
        db,
    }
}

/// Insert a user with the given Discord ID directly into the store.
#[allow(dead_code)]
pub async fn seed_user(db: &MemoryDb, discord_id: &str) -> User {
    let profile = DiscordProfile {
        id: discord_id.to_string(),
        username: format!("user{}", discord_id),
        global_name: None,
        avatar: None,
        email: None,
    };
    let user = User::from_profile(
        &profile,
        "seed-access".to_string(),
        Some("seed-refresh".to_string()),
        "2026-01-01T00:00:00.000Z",
    );
    db.insert_user(&user).await.unwrap();
    user
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values of a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The `Set-Cookie` header for `name`, if any.
#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
}

/// `name=value` pair from a `Set-Cookie` header, suitable for a `Cookie` header.
#[allow(dead_code)]
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

// ─── Fake Discord ─────────────────────────────────────────────

/// Authorization code the fake Discord rejects.
#[allow(dead_code)]
pub const BAD_CODE: &str = "bad-code";

/// Start a local stand-in for the Discord API and return its base URL.
///
/// Any authorization code except [`BAD_CODE`] is accepted; the code doubles
/// as the Discord user ID of the profile behind the issued token. Each
/// exchange issues a fresh access token (`at-<code>-<n>`).
#[allow(dead_code)]
pub async fn spawn_fake_discord() -> String {
    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let app = Router::new()
        .route(
            "/oauth2/token",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let counter = counter.clone();
                async move {
                    let code = form.get("code").cloned().unwrap_or_default();
                    let grant_type = form.get("grant_type").map(String::as_str);
                    if code == BAD_CODE || grant_type != Some("authorization_code") {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(serde_json::json!({ "error": "invalid_grant" })),
                        )
                            .into_response();
                    }
                    let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Json(serde_json::json!({
                        "access_token": format!("at-{}-{}", code, n),
                        "refresh_token": format!("rt-{}-{}", code, n),
                        "token_type": "Bearer",
                        "expires_in": 604800,
                        "scope": "identify email",
                    }))
                    .into_response()
                }
            }),
        )
        .route(
            "/users/@me",
            get(|headers: HeaderMap| async move {
                let token = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|h| h.strip_prefix("Bearer at-"));
                match token.and_then(|t| t.rsplit_once('-')) {
                    Some((discord_id, _)) => Json(serde_json::json!({
                        "id": discord_id,
                        "username": format!("user{}", discord_id),
                        "global_name": "Test User",
                        "avatar": null,
                        "email": "test@example.com",
                    }))
                    .into_response(),
                    None => StatusCode::UNAUTHORIZED.into_response(),
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Create a test app whose Discord client talks to a fake Discord.
#[allow(dead_code)]
pub async fn create_test_app_with_fake_discord() -> TestApp {
    let mut config = Config::test_default();
    config.discord_api_base = spawn_fake_discord().await;
    create_test_app_with_config(config)
}
