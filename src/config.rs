// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup (optionally from an `app.env` or `.env`
//! file) and shared through `AppState`.

use std::env;

const DEFAULT_FIREBASE_HOST: &str = "https://identitytoolkit.googleapis.com/v1/accounts";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP / Firebase project ID
    pub google_project_id: String,
    /// Identity Toolkit REST base, e.g. `https://identitytoolkit.googleapis.com/v1/accounts`
    pub firebase_host: String,
    /// Web API key passed as `key=` on Identity Toolkit calls
    pub firebase_key: String,
    /// Service account credential JSON (used for Firestore, custom tokens and admin calls)
    pub service_credential_json: String,
    /// Storage bucket for profile and routine images
    pub storage_bucket: String,
    /// Image assigned to every new account
    pub default_user_image_url: String,
    /// Allowed CORS origins; `*` allows any origin
    pub cors_allowed_origins: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            google_project_id: "test-project".to_string(),
            firebase_host: DEFAULT_FIREBASE_HOST.to_string(),
            firebase_key: "test_key".to_string(),
            service_credential_json: String::new(),
            storage_bucket: "test-project.appspot.com".to_string(),
            default_user_image_url: default_image_url("test-project.appspot.com"),
            cors_allowed_origins: "*".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `app.env` and `.env` in the working directory are read first if present;
    /// variables already set in the environment take precedence.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::from_filename("app.env").ok();
        dotenvy::dotenv().ok();

        let google_project_id = required("GOOGLE_PROJECT_ID")?;
        let storage_bucket = env::var("STORAGE_BUCKET")
            .unwrap_or_else(|_| format!("{}.appspot.com", google_project_id));

        let port_raw = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "8080".to_string());
        let port = port_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("SERVER_PORT", port_raw.clone()))?;

        Ok(Self {
            port,
            firebase_host: env::var("FIREBASE_HOST")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_FIREBASE_HOST.to_string()),
            firebase_key: required("FIREBASE_KEY")?,
            service_credential_json: env::var("SERVICE_CREDENTIAL_JSON")
                .map_err(|_| ConfigError::Missing("SERVICE_CREDENTIAL_JSON"))?,
            default_user_image_url: env::var("DEFAULT_USER_IMAGE_URL")
                .unwrap_or_else(|_| default_image_url(&storage_bucket)),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
            storage_bucket,
            google_project_id,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn default_image_url(bucket: &str) -> String {
    format!(
        "https://firebasestorage.googleapis.com/v0/b/{}/o/users%2Fuser_default.png?alt=media",
        bucket
    )
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
