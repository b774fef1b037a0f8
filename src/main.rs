// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GymPro API Server
//!
//! Accounts, subscriptions, nutrition goals and workout routines for the
//! GymPro mobile and admin apps.

use gympro_api::{
    config::Config,
    db::FirestoreDb,
    services::{FirebaseIdentity, RoutineService, ServiceAccount, TokenVerifier, UserService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, project = %config.google_project_id, "Starting GymPro API");

    // Initialize Firestore database
    let db = Arc::new(
        FirestoreDb::new(&config.google_project_id, &config.service_credential_json).await?,
    );

    // Identity provider: custom tokens, admin calls and storage use the service account
    let service_account = ServiceAccount::from_json(&config.service_credential_json)?;
    let verifier = TokenVerifier::new(&config.google_project_id)?;
    let identity = Arc::new(FirebaseIdentity::new(&config, service_account, verifier)?);
    tracing::info!(host = %config.firebase_host, "Identity provider initialized");

    let users = UserService::new(
        db.clone(),
        identity.clone(),
        config.default_user_image_url.clone(),
    );
    let routines = RoutineService::new(db, identity);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        users,
        routines,
    });

    // Build router
    let app = gympro_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gympro_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
