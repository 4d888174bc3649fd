// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for local development and tests.

use crate::db::Store;
use crate::error::AppError;
use crate::models::{Product, Purchase, User};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Store backed by concurrent hash maps.
#[derive(Default)]
pub struct MemoryDb {
    /// Users keyed by local ID.
    users: DashMap<String, User>,
    /// Discord ID -> local user ID. Guards Discord ID uniqueness.
    discord_index: DashMap<String, String>,
    products: DashMap<String, Product>,
    purchases: DashMap<String, Purchase>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of stored purchases across all users.
    pub fn purchase_count(&self) -> usize {
        self.purchases.len()
    }
}

#[async_trait]
impl Store for MemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn find_user_by_discord_id(&self, discord_id: &str) -> Result<Option<User>, AppError> {
        let Some(user_id) = self.discord_index.get(discord_id).map(|id| id.clone()) else {
            return Ok(None);
        };
        self.get_user(&user_id).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        // Claim the Discord ID first; the entry lock makes this the
        // single point where concurrent first logins are decided.
        match self.discord_index.entry(user.discord_id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!(
                    "User with Discord ID {} already exists",
                    user.discord_id
                )))
            }
            Entry::Vacant(slot) => {
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
            }
        }
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        match self.users.get_mut(&user.id) {
            Some(mut existing) => {
                if existing.discord_id != user.discord_id {
                    return Err(AppError::BadRequest(
                        "Discord ID of an existing user cannot change".to_string(),
                    ));
                }
                *existing = user.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("User {} not found", user.id))),
        }
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.iter().map(|p| p.value().clone()).collect())
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, AppError> {
        Ok(self.products.get(product_id).map(|p| p.clone()))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), AppError> {
        self.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), AppError> {
        self.purchases.insert(purchase.id.clone(), purchase.clone());
        Ok(())
    }

    async fn list_purchases_for_user(&self, user_id: &str) -> Result<Vec<Purchase>, AppError> {
        Ok(self
            .purchases
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.value().clone())
            .collect())
    }
}
