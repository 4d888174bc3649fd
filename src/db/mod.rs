// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers talk to a [`Store`]; production uses Firestore, local
//! development and tests use the in-memory store.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::StoreUrl;
use crate::error::AppError;
use crate::models::{Product, Purchase, User};
use async_trait::async_trait;
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    /// Users, keyed by Discord ID
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const PURCHASES: &str = "purchases";
}

/// Persistence operations used by the request handlers.
///
/// Every method is a single read or write; no operation spans entities.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Get a user by local ID.
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Get a user by Discord ID.
    async fn find_user_by_discord_id(&self, discord_id: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user.
    ///
    /// Fails with [`AppError::Conflict`] if a user with the same Discord ID exists.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    /// Overwrite an existing user record.
    async fn update_user(&self, user: &User) -> Result<(), AppError>;

    // ─── Products ────────────────────────────────────────────────

    async fn list_products(&self) -> Result<Vec<Product>, AppError>;

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, AppError>;

    async fn insert_product(&self, product: &Product) -> Result<(), AppError>;

    // ─── Purchases ───────────────────────────────────────────────

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), AppError>;

    /// All purchases made by a user, in no particular order.
    async fn list_purchases_for_user(&self, user_id: &str) -> Result<Vec<Purchase>, AppError>;
}

/// Connect to the store named by the connection string.
pub async fn connect(url: &StoreUrl) -> Result<Arc<dyn Store>, AppError> {
    match url {
        StoreUrl::Memory => {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryDb::new()))
        }
        StoreUrl::Firestore { project_id } => Ok(Arc::new(FirestoreDb::new(project_id).await?)),
    }
}
