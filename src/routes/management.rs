// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-management routes: listing, lookup and deletion.

use crate::db::UserQuery;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Role, User, UsersResponse};
use crate::pagination::Page;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Management routes; the auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/active", get(get_users_active))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
}

/// Raw listing parameters; invalid pages fall back to the default page.
#[derive(Debug, Default, Deserialize)]
struct UsersParams {
    offset: Option<String>,
    limit: Option<String>,
    user_role: Option<String>,
    filter: Option<String>,
}

impl UsersParams {
    fn into_query(self) -> Result<UserQuery> {
        let role = match self.user_role.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Role>()
                    .map_err(|e| AppError::invalid_input("management_handler.GetUsers", e))?,
            ),
        };

        Ok(UserQuery {
            page: Page::resolve(self.offset.as_deref(), self.limit.as_deref()),
            role,
            filter: self.filter.filter(|f| !f.trim().is_empty()),
            active_on: None,
        })
    }
}

async fn get_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UsersParams>,
) -> Result<Json<UsersResponse>> {
    let query = params.into_query()?;
    Ok(Json(state.users.get_users(query).await?))
}

async fn get_users_active(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UsersParams>,
) -> Result<Json<UsersResponse>> {
    let query = params.into_query()?;
    Ok(Json(state.users.get_users_active(query).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.get_user_by_id(&user_id).await?))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    tracing::info!(requester = %caller.user_id, user_id = %user_id, "Admin user deletion");
    state.users.delete_user(&caller.user_id, &user_id).await?;
    Ok(StatusCode::OK)
}
