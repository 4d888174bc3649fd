// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Product catalog model.

use serde::{de, Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// A product offered in the shop. Every field except the ID is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Product {
    /// Product ID (UUID v4, also used as document ID)
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Image URL or path
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: String,
}

/// Request body for creating a product.
///
/// Fields are coerced to their types (`"10"` is a price of 10, `5` is a
/// name of `"5"`). The length caps bound request size only.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewProduct {
    #[serde(default, deserialize_with = "coerce_string")]
    #[validate(length(max = 1000))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce_string")]
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "coerce_string")]
    #[validate(length(max = 8192))]
    pub image: Option<String>,
}

impl NewProduct {
    /// Turn a request into a stored product.
    pub fn into_product(self, now: &str) -> Product {
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            created_at: now.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

/// String field: accepts a string or a number, `null` is absent.
fn coerce_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)
        .map_err(|_| de::Error::custom("expected a string"))?;
    Ok(value.map(|v| match v {
        Scalar::Text(s) => s,
        Scalar::Number(n) => n.to_string(),
    }))
}

/// Number field: accepts a number or a numeric string. `null` and a blank
/// string are absent.
fn coerce_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)
        .map_err(|_| de::Error::custom("expected a number"))?;
    let number = match value {
        None => return Ok(None),
        Some(Scalar::Number(n)) => n.as_f64(),
        Some(Scalar::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse::<f64>().ok(),
    };
    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(de::Error::custom("expected a number")),
    }
}
