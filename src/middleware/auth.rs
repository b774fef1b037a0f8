// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token authentication middleware.

use crate::error::AppError;
use crate::models::SessionClaims;
use crate::services::token_verifier::extract_bearer_token;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated caller, built from the verified session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub claims: SessionClaims,
}

/// Middleware that requires a valid `Authorization: Bearer` session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers().get(header::AUTHORIZATION))
        .map_err(AppError::from)?
        .to_string();

    let claims = state.users.verify_token(&token).await?;

    let auth_user = AuthUser {
        user_id: claims.user_id.clone(),
        claims,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
