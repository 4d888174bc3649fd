// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Purchase;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user", get(get_user))
        .route("/buy/{product_id}", post(buy))
        .route("/purchases", get(list_purchases))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response. OAuth tokens are never included.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub discord_id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

/// Get current user profile.
async fn get_user(Extension(auth): Extension<AuthUser>) -> Json<UserResponse> {
    let user = auth.user;
    let avatar_url = user.avatar_url();

    Json(UserResponse {
        id: user.id,
        discord_id: user.discord_id,
        username: user.username,
        global_name: user.global_name,
        avatar: user.avatar,
        avatar_url,
        created_at: user.created_at,
    })
}

// ─── Purchases ───────────────────────────────────────────────

/// Response for a successful purchase.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BuyResponse {
    pub message: String,
    pub purchase: Purchase,
}

/// Record a purchase of `product_id` by the current user.
///
/// No payment, no stock, and no deduplication: each call adds a record.
async fn buy(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(product_id): Path<String>,
) -> Result<Json<BuyResponse>> {
    let product = state
        .db
        .get_product(&product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let purchase = Purchase::new(
        &auth.user.id,
        &product.id,
        format_utc_rfc3339(chrono::Utc::now()),
    );
    state.db.insert_purchase(&purchase).await?;

    tracing::info!(
        user_id = %auth.user.id,
        product_id = %product.id,
        purchase_id = %purchase.id,
        "Purchase recorded"
    );

    Ok(Json(BuyResponse {
        message: "Purchase successful".to_string(),
        purchase,
    }))
}

/// List the current user's purchases, newest first.
async fn list_purchases(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Purchase>>> {
    let mut purchases = state.db.list_purchases_for_user(&auth.user.id).await?;
    purchases.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(purchases))
}
