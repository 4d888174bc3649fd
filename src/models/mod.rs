// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod product;
pub mod purchase;
pub mod user;

pub use product::{NewProduct, Product};
pub use purchase::Purchase;
pub use user::{DiscordProfile, User};
