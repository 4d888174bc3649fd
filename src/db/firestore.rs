// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile and OAuth tokens, keyed by Discord ID)
//! - Products (catalog)
//! - Purchases (one document per purchase)

use crate::db::{collections, Store};
use crate::error::AppError;
use crate::models::{Product, Purchase, User};
use async_trait::async_trait;
use firestore::errors::FirestoreError;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }
}

fn db_err(e: FirestoreError) -> AppError {
    AppError::Database(e.to_string())
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user_id = user_id.to_string();
        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("id").eq(user_id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_err)?;
        Ok(users.into_iter().next())
    }

    async fn find_user_by_discord_id(&self, discord_id: &str) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(discord_id)
            .await
            .map_err(db_err)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        // `insert` fails if the document exists, so the Discord ID
        // document key is what enforces one user per Discord account.
        let result: Result<User, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.discord_id)
            .object(user)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(FirestoreError::DataConflictError(_)) => Err(AppError::Conflict(format!(
                "User with Discord ID {} already exists",
                user.discord_id
            ))),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let _: User = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.discord_id)
            .object(user)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ─── Product Operations ──────────────────────────────────────

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::PRODUCTS)
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::PRODUCTS)
            .obj()
            .one(product_id)
            .await
            .map_err(db_err)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), AppError> {
        let _: Product = self
            .client
            .fluent()
            .insert()
            .into(collections::PRODUCTS)
            .document_id(&product.id)
            .object(product)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ─── Purchase Operations ─────────────────────────────────────

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), AppError> {
        let _: Purchase = self
            .client
            .fluent()
            .insert()
            .into(collections::PURCHASES)
            .document_id(&purchase.id)
            .object(purchase)
            .execute()
            .await
            .map_err(db_err)?;

        tracing::debug!(
            purchase_id = %purchase.id,
            user_id = %purchase.user_id,
            product_id = %purchase.product_id,
            "Purchase stored"
        );
        Ok(())
    }

    async fn list_purchases_for_user(&self, user_id: &str) -> Result<Vec<Purchase>, AppError> {
        let user_id = user_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::PURCHASES)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)
    }
}
