// ABOUTME: Database configuration types for PostgreSQL credentials and SQLite files
// ABOUTME: Loads connection settings from the environment and builds sqlx connection strings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use crate::constants::database_env;
use crate::database::DatabaseError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// Individual `PostgreSQL` connection settings supplied by the configuration provider
///
/// Every field is required; a missing one surfaces as
/// [`DatabaseError::Configuration`] when a connection is first opened.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCredentials {
    /// Server host name or address
    pub host: Option<String>,
    /// Server port
    pub port: Option<u16>,
    /// Database name
    pub database_name: Option<String>,
    /// Login role
    pub user: Option<String>,
    /// Login password
    pub password: Option<String>,
}

impl DatabaseCredentials {
    /// Load credentials from `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`
    ///
    /// Unset variables stay `None` and are reported on first connection.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Configuration`] if `DB_PORT` is set but not a valid port
    pub fn from_env() -> Result<Self, DatabaseError> {
        let port = match env::var(database_env::DB_PORT) {
            Ok(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
                DatabaseError::Configuration {
                    context: format!("invalid {}: {e}", database_env::DB_PORT),
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            host: env::var(database_env::DB_HOST).ok(),
            port,
            database_name: env::var(database_env::DB_NAME).ok(),
            user: env::var(database_env::DB_USER).ok(),
            password: env::var(database_env::DB_PASSWORD).ok(),
        })
    }

    /// Build a `postgres://` connection string
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Configuration`] naming the first missing field
    pub fn to_connection_string(&self) -> Result<String, DatabaseError> {
        let host = required(self.host.as_deref(), database_env::DB_HOST)?;
        let port = self
            .port
            .ok_or_else(|| DatabaseError::missing_setting(database_env::DB_PORT))?;
        let database_name = required(self.database_name.as_deref(), database_env::DB_NAME)?;
        let user = required(self.user.as_deref(), database_env::DB_USER)?;
        // An empty password is a valid setting, only absence is an error
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| DatabaseError::missing_setting(database_env::DB_PASSWORD))?;

        Ok(format!(
            "postgres://{}:{}@{host}:{port}/{}",
            urlencoding::encode(user),
            urlencoding::encode(password),
            urlencoding::encode(database_name),
        ))
    }
}

impl Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, DatabaseError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DatabaseError::missing_setting(name)),
    }
}

/// Where connections are opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `PostgreSQL` from individual credentials
    PostgreSQL {
        /// Connection settings
        credentials: DatabaseCredentials,
    },
    /// `PostgreSQL` from a full connection string
    PostgreSQLUrl {
        /// `postgres://` connection string
        connection_string: String,
    },
    /// `SQLite` database file, created on first connect
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite`; every connection sees its own empty database
    Memory,
}

impl DatabaseUrl {
    /// Parse a `DATABASE_URL` value
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            if path_str == ":memory:" {
                Self::Memory
            } else {
                Self::SQLite {
                    path: PathBuf::from(path_str),
                }
            }
        } else if s.starts_with("postgresql://") || s.starts_with("postgres://") {
            Self::PostgreSQLUrl {
                connection_string: s.to_owned(),
            }
        } else {
            // Fallback: treat as SQLite file path
            Self::SQLite {
                path: PathBuf::from(s),
            }
        }
    }

    /// Convert to a sqlx connection string
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Configuration`] if `PostgreSQL` credentials are incomplete
    pub fn to_connection_string(&self) -> Result<String, DatabaseError> {
        match self {
            Self::PostgreSQL { credentials } => credentials.to_connection_string(),
            Self::PostgreSQLUrl { connection_string } => Ok(connection_string.clone()),
            // Ensure SQLite creates the database file if it doesn't exist
            Self::SQLite { path } => Ok(format!("sqlite:{}?mode=rwc", path.display())),
            Self::Memory => Ok("sqlite::memory:".into()),
        }
    }

    /// Check if this is a `PostgreSQL` target
    #[must_use]
    pub const fn is_postgresql(&self) -> bool {
        matches!(self, Self::PostgreSQL { .. } | Self::PostgreSQLUrl { .. })
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        // Never print credentials
        match self {
            Self::PostgreSQL { credentials } => write!(
                f,
                "postgres://{}:{}/{}",
                credentials.host.as_deref().unwrap_or("?"),
                credentials.port.map_or_else(|| "?".to_owned(), |p| p.to_string()),
                credentials.database_name.as_deref().unwrap_or("?"),
            ),
            Self::PostgreSQLUrl { .. } => f.write_str("postgres://<redacted>"),
            Self::SQLite { path } => write!(f, "sqlite:{}", path.display()),
            Self::Memory => f.write_str("sqlite::memory:"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection target
    pub url: DatabaseUrl,
}

impl DatabaseConfig {
    /// Create a configuration for the given target
    #[must_use]
    pub const fn new(url: DatabaseUrl) -> Self {
        Self { url }
    }

    /// Load from the environment
    ///
    /// `DATABASE_URL` wins when set; otherwise the individual `DB_*` credentials are used.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Configuration`] if `DB_PORT` is malformed
    pub fn from_env() -> Result<Self, DatabaseError> {
        let url = match env::var(database_env::DATABASE_URL) {
            Ok(raw) if !raw.trim().is_empty() => DatabaseUrl::parse_url(raw.trim()),
            _ => DatabaseUrl::PostgreSQL {
                credentials: DatabaseCredentials::from_env()?,
            },
        };
        Ok(Self { url })
    }

    /// Connection string for the configured target
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Configuration`] if required settings are missing
    pub fn connection_string(&self) -> Result<String, DatabaseError> {
        self.url.to_connection_string()
    }
}
