// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication payloads and session claims.

use crate::models::user::{Goals, ModuleGrant, Progress, Role, User, WeeklyRoutine};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Email/password credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token pair returned by the identity provider for sign-up, sign-in and
/// custom-token exchange.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenResponse {
    pub kind: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub is_new_user: bool,
    /// Identity-provider uid
    pub local_id: String,
}

/// Response body of a successful login.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Request for a verification or password-reset email.
///
/// For `VERIFY_EMAIL` the `email` field carries the caller's ID token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OobRequest {
    pub email: String,
    pub request_type: String,
}

impl OobRequest {
    pub const VERIFY_EMAIL: &'static str = "VERIFY_EMAIL";

    pub fn is_verify_email(&self) -> bool {
        self.request_type == Self::VERIFY_EMAIL
    }
}

/// Out-of-band confirmation code from a verification email.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OobCode {
    pub oob_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Fresh token pair returned by `/auth/refresh`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub token: String,
    pub refresh_token: String,
}

/// Claims minted into the session token at login and read back by the auth
/// middleware, so authenticated requests need no user lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionClaims {
    pub user_id: String,
    pub email: String,
    pub subscription: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub birthday: String,
    pub phone_number: String,
    #[serde(rename = "modulesWithPermission")]
    pub modules: Vec<ModuleGrant>,
    #[serde(rename = "url_image")]
    pub image_url: String,
    #[serde(rename = "user_role")]
    pub role: Role,
    #[serde(rename = "userProgress")]
    pub progress: Progress,
    #[serde(rename = "userGoals")]
    pub goals: Goals,
    #[serde(rename = "userRoutine")]
    pub weekly_routine: WeeklyRoutine,
}

impl SessionClaims {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            subscription: user.subscription.clone(),
            full_name: user.full_name(),
            birthday: user.birthday.clone(),
            phone_number: user.phone_number.clone(),
            modules: user.modules.clone(),
            image_url: user.image_url.clone(),
            role: user.role,
            progress: user.progress.clone(),
            goals: user.goals.clone(),
            weekly_routine: user.weekly_routine.clone(),
        }
    }
}
