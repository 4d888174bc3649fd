// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product catalog routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::current_user;
use crate::models::{NewProduct, Product};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/products", get(list_products).post(create_product))
}

/// List every product. No filtering or pagination.
async fn list_products(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>> {
    let products = state.db.list_products().await?;
    Ok(Json(products))
}

/// Create a product from the request body.
///
/// When `PRODUCT_ADMIN_IDS` is empty anyone may call this.
async fn create_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    if state.config.product_creation_restricted() {
        let user = current_user(&state, &headers).await?;
        if !state.config.product_admin_ids.contains(&user.discord_id) {
            tracing::warn!(
                user_id = %user.id,
                discord_id = %user.discord_id,
                "Product creation denied for non-admin"
            );
            return Err(AppError::Forbidden);
        }
    }

    let Json(new_product) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_product
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let product = new_product.into_product(&format_utc_rfc3339(chrono::Utc::now()));
    state.db.insert_product(&product).await?;

    tracing::info!(product_id = %product.id, name = ?product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}
