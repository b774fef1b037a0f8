// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every error carries the label of the operation that produced it, so a
//! failure deep inside a remote call still tells the client which step broke.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error categories exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "CONFLICT")]
    Conflict,
    #[serde(rename = "UNAUTHORIZED")]
    Unauthorized,
    #[serde(rename = "FORBIDDEN")]
    Forbidden,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// HTTP status for this error category.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
#[error("{operation}: {message}")]
pub struct AppError {
    /// Operation label, e.g. `user_service.SignInWithPass`.
    pub operation: &'static str,
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn new(operation: &'static str, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            operation,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorCode::InvalidInput, message)
    }

    pub fn not_found(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorCode::NotFound, message)
    }

    pub fn conflict(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorCode::Conflict, message)
    }

    pub fn unauthorized(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorCode::Forbidden, message)
    }

    pub fn internal(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorCode::InternalError, message)
    }

    /// Wrap an unexpected lower-level failure (remote call, decoding).
    pub fn from_source(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::internal(operation, err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain on one line
        AppError::internal("internal", format!("{:#}", err))
    }
}

/// JSON error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse<'a> {
    operation: &'a str,
    error_code: ErrorCode,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.status();

        let message = if self.code == ErrorCode::InternalError {
            tracing::error!(
                operation = self.operation,
                error = %self.message,
                "Internal server error"
            );
            "Internal server error"
        } else {
            tracing::debug!(
                operation = self.operation,
                code = ?self.code,
                error = %self.message,
                "Request failed"
            );
            self.message.as_str()
        };

        let body = ErrorResponse {
            operation: self.operation,
            error_code: self.code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
