// ABOUTME: Structured error taxonomy for the request-scoped data access layer
// ABOUTME: Distinguishes configuration, connection, query, and caller-misuse failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use thiserror::Error;

/// Errors raised by [`super::Database`] operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection settings are missing or invalid; fatal until configuration changes
    #[error("database configuration error: {context}")]
    Configuration {
        /// Which setting was missing or malformed
        context: String,
    },

    /// The connect call failed; surfaced without retry
    #[error("database connection error: {context}")]
    Connection {
        /// Driver message
        context: String,
    },

    /// Statement execution failed (malformed SQL, constraint violation, decode failure)
    #[error("query error: {context}")]
    Query {
        /// Driver message
        context: String,
    },

    /// Caller combined options that cannot be honored; raised before any I/O
    #[error("invalid usage: {context}")]
    InvalidUsage {
        /// What was misused
        context: String,
    },
}

impl DatabaseError {
    /// Build a `Query` error from a driver error
    pub(crate) fn query(error: &sqlx::Error) -> Self {
        Self::Query {
            context: error.to_string(),
        }
    }

    /// Build a `Connection` error from a driver error
    pub(crate) fn connection(error: &sqlx::Error) -> Self {
        Self::Connection {
            context: error.to_string(),
        }
    }

    /// Missing required configuration field
    pub(crate) fn missing_setting(name: &str) -> Self {
        Self::Configuration {
            context: format!("missing required setting {name}"),
        }
    }
}
