// ABOUTME: Unified application error type with error codes and HTTP status mapping
// ABOUTME: Wraps database-layer errors so callers handle one AppError/AppResult pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! # Unified Error Handling
//!
//! `AppError` is the error surfaced by the public API. Database failures keep their
//! own taxonomy in [`crate::database::DatabaseError`] and convert into `AppError`
//! with a matching [`ErrorCode`]. Authentication failures are not errors: the
//! credential verifier reports them as `Ok(None)`.

use crate::database::DatabaseError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request input failed validation
    InvalidInput,
    /// Caller combined options that cannot be used together
    InvalidUsage,
    /// Required configuration is missing or malformed
    ConfigInvalid,
    /// The database could not be reached
    DatabaseUnavailable,
    /// A query failed to execute
    DatabaseError,
    /// Password hashing or token signing machinery failed
    CryptoError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidUsage => 400,
            Self::DatabaseUnavailable => 503,
            Self::ConfigInvalid | Self::DatabaseError | Self::CryptoError | Self::InternalError => {
                500
            }
        }
    }

    /// User-facing description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidUsage => "The operation was called with incompatible options",
            Self::ConfigInvalid => "Configuration is missing or invalid",
            Self::DatabaseUnavailable => "The database is unavailable",
            Self::DatabaseError => "Database operation failed",
            Self::CryptoError => "Password hashing or token signing failed",
            Self::InternalError => "An internal error occurred",
        }
    }
}

/// Unified error type for the library
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Password hashing or token signing failure
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        let code = match &error {
            DatabaseError::Configuration { .. } => ErrorCode::ConfigInvalid,
            DatabaseError::Connection { .. } => ErrorCode::DatabaseUnavailable,
            DatabaseError::Query { .. } => ErrorCode::DatabaseError,
            DatabaseError::InvalidUsage { .. } => ErrorCode::InvalidUsage,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: ErrorCode,
    /// Error message
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // Internal details stay in the logs
        let message = if status.is_server_error() {
            tracing::error!(code = ?self.code, error = %self, "Request failed");
            self.code.description().to_owned()
        } else {
            self.message
        };
        (
            status,
            Json(ErrorResponse {
                code: self.code,
                message,
            }),
        )
            .into_response()
    }
}
