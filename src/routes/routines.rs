// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routine catalog routes.

use crate::error::Result;
use crate::models::Routine;
use crate::routes::{image_upload, json_body, IMAGE_BODY_LIMIT};
use crate::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/routines", get(get_routines).post(add_routine))
        .route(
            "/routines/image/{id}",
            put(update_routine_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
}

#[derive(Deserialize)]
struct RoutinesParams {
    muscle_group: Option<String>,
}

async fn get_routines(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RoutinesParams>,
) -> Result<Json<Vec<Routine>>> {
    Ok(Json(
        state
            .routines
            .get_routines(params.muscle_group.as_deref())
            .await?,
    ))
}

async fn add_routine(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Routine>, JsonRejection>,
) -> Result<StatusCode> {
    let routine = json_body("routines_handler.AddRoutine", payload)?;
    state.routines.add_routine(routine).await?;
    Ok(StatusCode::OK)
}

async fn update_routine_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<StatusCode> {
    let image = image_upload("routines_handler.UpdateRoutineImage", multipart).await?;
    state
        .routines
        .update_routine_image(&id, image.bytes, image.content_type.as_deref())
        .await?;
    Ok(StatusCode::OK)
}
