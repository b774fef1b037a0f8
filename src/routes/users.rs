// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes for authenticated users.

use crate::error::Result;
use crate::models::{Goals, Progress, User, WeeklyRoutine};
use crate::routes::{image_upload, json_body, IMAGE_BODY_LIMIT};
use crate::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, State,
    },
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{user_id}", put(update_user))
        .route(
            "/users/image/{user_id}",
            put(update_image_user).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
        .route("/users/goals/{user_id}", post(save_progress_goals))
        .route("/users/routines/{user_id}", post(save_routines))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<User>, JsonRejection>,
) -> Result<StatusCode> {
    let user = json_body("user_handler.UpdateUser", payload)?;
    state.users.update_user(&user_id, user).await?;
    Ok(StatusCode::OK)
}

/// Multipart upload; the picture is the `image` field.
async fn update_image_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<StatusCode> {
    let image = image_upload("user_handler.UpdateImageUser", multipart).await?;
    state
        .users
        .update_image_user(&user_id, image.bytes, image.content_type.as_deref())
        .await?;
    Ok(StatusCode::OK)
}

/// Store measurements and return the recomputed goals.
async fn save_progress_goals(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<Progress>, JsonRejection>,
) -> Result<Json<Goals>> {
    let progress = json_body("user_handler.SaveProgressGoals", payload)?;
    Ok(Json(state.users.save_user_progress(&user_id, &progress).await?))
}

async fn save_routines(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<WeeklyRoutine>, JsonRejection>,
) -> Result<StatusCode> {
    let routine = json_body("user_handler.SaveRoutines", payload)?;
    state.users.add_routine_to_user(&user_id, &routine).await?;
    Ok(StatusCode::OK)
}
