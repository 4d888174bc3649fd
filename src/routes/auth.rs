// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Discord OAuth authentication routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_token, session_cookie, session_removal_cookie};
use crate::services::LoginOutcome;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Cookie binding the OAuth `state` to the browser that started the login.
pub const OAUTH_NONCE_COOKIE: &str = "oauth_nonce";

/// Path the nonce cookie is scoped to.
const CALLBACK_PATH: &str = "/auth/discord/callback";

/// How long a login attempt may take before its state is rejected.
const OAUTH_STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/discord", get(auth_start))
        .route(CALLBACK_PATH, get(auth_callback))
        .route("/logout", get(logout))
}

/// Start OAuth flow - redirect to Discord authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let timestamp = now_millis()?;
    let oauth_state = sign_state(&nonce, timestamp, &state.config.session_secret)?;

    let auth_url = state.discord_service.authorize_url(&oauth_state);

    tracing::info!(
        client_id = %state.config.discord_client_id,
        "Starting OAuth flow, redirecting to Discord"
    );

    let jar = jar.add(nonce_cookie(nonce, state.config.secure_cookies()));
    Ok((jar, Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code, store user, establish session.
///
/// Every failure ends in a redirect to `/` without a session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    params: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> (CookieJar, Redirect) {
    let secure = state.config.secure_cookies();
    let nonce = jar.get(OAUTH_NONCE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(nonce_cookie(String::new(), secure));

    let params = match params {
        Ok(Query(params)) => params,
        Err(e) => {
            tracing::warn!(error = %e.body_text(), "Malformed OAuth callback query");
            return (jar, Redirect::to("/"));
        }
    };

    match complete_login(&state, nonce.as_deref(), params).await {
        Ok(outcome) => {
            let token = match create_session_token(&outcome.user.id, &state.config.session_secret)
            {
                Ok(token) => token,
                Err(e) => {
                    tracing::error!(error = %e, "Session token creation failed");
                    return (jar, Redirect::to("/"));
                }
            };

            tracing::info!(
                user_id = %outcome.user.id,
                discord_id = %outcome.user.discord_id,
                created = outcome.created,
                "Login successful, session established"
            );

            (jar.add(session_cookie(token, secure)), Redirect::to("/"))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed, redirecting without session");
            (jar, Redirect::to("/"))
        }
    }
}

async fn complete_login(
    state: &AppState,
    nonce: Option<&str>,
    params: CallbackParams,
) -> Result<LoginOutcome> {
    if let Some(error) = params.error {
        return Err(AppError::DiscordApi(format!("authorization denied: {}", error)));
    }

    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return Err(AppError::BadRequest(
            "missing code or state parameter".to_string(),
        ));
    };

    let now = now_millis()?;
    let state_nonce = verify_state(&oauth_state, &state.config.session_secret, now)
        .ok_or_else(|| AppError::BadRequest("invalid or expired OAuth state".to_string()))?;

    if nonce != Some(state_nonce.as_str()) {
        return Err(AppError::BadRequest(
            "OAuth state does not belong to this browser".to_string(),
        ));
    }

    tracing::info!("Exchanging authorization code for tokens");
    state.discord_service.handle_oauth_callback(&code).await
}

/// Logout - clear the session cookie and return to the UI.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(session_removal_cookie(state.config.secure_cookies()));
    (jar, Redirect::to("/"))
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

fn nonce_cookie(nonce: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_NONCE_COOKIE, nonce))
        .path(CALLBACK_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::milliseconds(OAUTH_STATE_MAX_AGE_MS as i64))
        .build()
}

/// Build the OAuth `state`: `nonce|timestamp_hex|signature_hex`, base64url encoded.
fn sign_state(nonce: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", nonce, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the signature and age of an OAuth `state`, returning its nonce.
fn verify_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }
    let (nonce, timestamp_hex, signature_hex) = (parts[0], parts[1], parts[2]);

    let payload = format!("{}|{}", nonce, timestamp_hex);
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if issued > now_ms || now_ms - issued > OAUTH_STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"secret_key";
    const NOW: u128 = 1_700_000_000_000;

    #[test]
    fn test_verify_state_success() {
        let state = sign_state("nonce123", NOW, SECRET).unwrap();
        assert_eq!(
            verify_state(&state, SECRET, NOW + 1000),
            Some("nonce123".to_string())
        );
    }

    #[test]
    fn test_verify_state_wrong_secret() {
        let state = sign_state("nonce123", NOW, SECRET).unwrap();
        assert_eq!(verify_state(&state, b"wrong_key", NOW), None);
    }

    #[test]
    fn test_verify_state_invalid_signature() {
        let payload = format!("nonce123|{:x}|{}", NOW, "00ff");
        let state = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        assert_eq!(verify_state(&state, SECRET, NOW), None);
    }

    #[test]
    fn test_verify_state_expired() {
        let state = sign_state("nonce123", NOW, SECRET).unwrap();
        assert_eq!(
            verify_state(&state, SECRET, NOW + OAUTH_STATE_MAX_AGE_MS + 1),
            None
        );
    }

    #[test]
    fn test_verify_state_from_future() {
        let state = sign_state("nonce123", NOW + 60_000, SECRET).unwrap();
        assert_eq!(verify_state(&state, SECRET, NOW), None);
    }

    #[test]
    fn test_verify_state_malformed() {
        assert_eq!(verify_state("not-valid-base64!!!", SECRET, NOW), None);
        let encoded = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(verify_state(&encoded, SECRET, NOW), None);
    }

    #[test]
    fn test_state_is_url_safe() {
        let state = sign_state("nonce123", NOW, SECRET).unwrap();
        assert!(!state.contains('+'));
        assert!(!state.contains('/'));
        assert!(!state.contains('='));
    }
}
