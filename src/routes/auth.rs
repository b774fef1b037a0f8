// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public account routes: signup, login, token refresh and email flows.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{AuthResponse, Credentials, OobCode, OobRequest, RefreshRequest, SessionTokens, User};
use crate::routes::json_body;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/verifyEmail", post(send_oob_email))
        .route("/auth/recover", post(send_oob_email))
        .route("/auth/sendOobCode", post(confirm_oob_code))
}

/// Create an account and its profile.
async fn signup(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<User>, JsonRejection>,
) -> Result<StatusCode> {
    let user = json_body("auth_handler.SignUp", payload)?;
    state.users.create_user(user).await?;
    Ok(StatusCode::OK)
}

async fn login(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let creds = json_body("auth_handler.Login", payload)?;
    tracing::info!(email = %creds.email, "Login attempt");
    Ok(Json(state.users.sign_in_with_pass(&creds).await?))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<SessionTokens>> {
    let request = json_body("auth_handler.Refresh", payload)?;
    Ok(Json(state.users.refresh_session(&request.refresh_token).await?))
}

/// Verification (`VERIFY_EMAIL`) or password-reset email.
async fn send_oob_email(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<OobRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let request = json_body("auth_handler.VerifyOrRecoverEmail", payload)?;
    state.users.verify_or_recover_email(&request).await?;
    Ok(StatusCode::OK)
}

async fn confirm_oob_code(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<OobCode>, JsonRejection>,
) -> Result<StatusCode> {
    let code = json_body("auth_handler.VerifyOobCode", payload)?;
    state.users.verify_oob_code(&code).await?;
    Ok(StatusCode::OK)
}
