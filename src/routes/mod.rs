// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod management;
pub mod routines;
pub mod users;

use crate::error::{AppError, Result};
use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Upper bound for image upload bodies.
pub const IMAGE_BODY_LIMIT: usize = 10 * 1024 * 1024;

const CORS_MAX_AGE: Duration = Duration::from_secs(50);

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Unwrap a JSON body, turning extractor rejections into `InvalidInput`.
pub(crate) fn json_body<T>(
    operation: &'static str,
    payload: std::result::Result<Json<T>, JsonRejection>,
) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::invalid_input(operation, format!("Invalid format: {}", e.body_text())))
}

/// Image read from a multipart `image` field.
pub(crate) struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Read the `image` field of a multipart request.
pub(crate) async fn image_upload(
    operation: &'static str,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ImageUpload> {
    let failed = |e: &dyn std::fmt::Display| {
        AppError::invalid_input(operation, format!("Failed to get image: {}", e))
    };

    let mut multipart = multipart.map_err(|e| failed(&e))?;

    while let Some(field) = multipart.next_field().await.map_err(|e| failed(&e))? {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| failed(&e))?;
        return Ok(ImageUpload {
            bytes: bytes.to_vec(),
            content_type,
        });
    }

    Err(failed(&"missing \"image\" field"))
}

/// CORS policy: `*` allows any origin, otherwise a comma-separated list.
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let allow_origin = if allowed_origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            allowed_origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers([header::ORIGIN, header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(CORS_MAX_AGE)
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(management::routes())
        .merge(users::routes())
        .merge(routines::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api_v1 = Router::new().merge(auth::routes()).merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
