// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Local user ID (UUID v4), carried in the session token
    pub id: String,
    /// Discord user ID (unique; also the Firestore document ID)
    pub discord_id: String,
    /// Discord username
    pub username: String,
    /// Discord display name
    pub global_name: Option<String>,
    /// Discord avatar hash
    pub avatar: Option<String>,
    /// Latest Discord OAuth access token
    pub access_token: String,
    /// Latest Discord OAuth refresh token
    pub refresh_token: Option<String>,
    /// When the user first logged in
    pub created_at: String,
    /// When tokens were last refreshed
    pub updated_at: String,
}

impl User {
    /// Build a new user from a Discord profile and freshly issued tokens.
    pub fn from_profile(
        profile: &DiscordProfile,
        access_token: String,
        refresh_token: Option<String>,
        now: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            discord_id: profile.id.clone(),
            username: profile.username.clone(),
            global_name: profile.global_name.clone(),
            avatar: profile.avatar.clone(),
            access_token,
            refresh_token,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Discord CDN URL for the user's avatar, if they have one.
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar.as_ref().map(|hash| {
            format!(
                "https://cdn.discordapp.com/avatars/{}/{}.png",
                self.discord_id, hash
            )
        })
    }
}

/// Profile returned by Discord's `/users/@me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
