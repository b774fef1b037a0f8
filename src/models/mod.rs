// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod auth;
pub mod routine;
pub mod user;

pub use auth::{
    AuthResponse, Credentials, OobCode, OobRequest, RefreshRequest, SessionClaims, SessionTokens,
    TokenResponse,
};
pub use routine::Routine;
pub use user::{Goals, ModuleGrant, Progress, Role, User, UsersResponse, WeeklyRoutine};
