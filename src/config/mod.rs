// ABOUTME: Configuration module for database targets, password hashing policy, and auth tokens
// ABOUTME: Environment-only configuration; every section exposes a from_env constructor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! Configuration for webtools
//!
//! - **Database**: `PostgreSQL` credentials or a `SQLite` file for request-scoped connections
//! - **Security**: the explicit password hashing policy
//! - **Tokens**: signing secret, issuer, and lifetime of bearer auth tokens

/// Database connection settings
pub mod database;
/// Password hashing policy
pub mod security;
/// Bearer auth token settings
pub mod token;

pub use database::{DatabaseConfig, DatabaseCredentials, DatabaseUrl};
pub use security::{Argon2Settings, HashAlgorithm, PasswordPolicy};
pub use token::TokenConfig;
