// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod discord;

pub use discord::{DiscordClient, DiscordService, LoginOutcome};
