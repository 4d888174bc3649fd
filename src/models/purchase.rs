// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Purchase record linking a user to a product.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Immutable record of a user buying a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Purchase {
    /// Purchase ID (UUID v4, also used as document ID)
    pub id: String,
    /// Local user ID of the buyer
    pub user_id: String,
    /// Product that was bought
    pub product_id: String,
    /// Time of purchase (RFC3339, UTC)
    pub date: String,
}

impl Purchase {
    pub fn new(user_id: &str, product_id: &str, date: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            date,
        }
    }
}
