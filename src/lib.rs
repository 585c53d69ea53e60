// ABOUTME: Main library entry point for the webtools web backend utilities
// ABOUTME: Request-scoped database access and password authentication with hash upgrades
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

#![deny(unsafe_code)]

//! # webtools
//!
//! Building blocks for web backends.
//!
//! ## Features
//!
//! - **Database access**: one lazily opened connection per [`database::RequestContext`],
//!   parameterized reads, and transactional writes with rollback on failure
//! - **Password authentication**: credential verification that upgrades stored hashes
//!   from deprecated schemes (bcrypt) to the current one (Argon2id) on login
//! - **Login guard**: axum middleware redirecting anonymous requests to the login page
//! - **Auth tokens**: signed bearer tokens for API clients and a guard answering 401
//!   when the token is missing, invalid, expired, or names a deleted user
//! - **Request helpers**: parameter normalization, typographic cleanup, page counts
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webtools::auth::{CredentialVerifier, PasswordContext};
//! use webtools::config::{DatabaseConfig, PasswordPolicy};
//! use webtools::database::{Database, DataAccessProvider, RequestContext};
//! use webtools::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let database = Arc::new(Database::new(DatabaseConfig::from_env()?));
//!     let passwords = Arc::new(PasswordContext::new(PasswordPolicy::from_env()?)?);
//!     let verifier = CredentialVerifier::new(Arc::clone(&database), passwords);
//!
//!     let mut ctx = RequestContext::new();
//!     let user = verifier
//!         .authenticate(&mut ctx, Some("alice"), Some("correct horse"))
//!         .await?;
//!     database.release_connection(&mut ctx).await;
//!
//!     println!("authenticated: {user:?}");
//!     Ok(())
//! }
//! ```

/// Password hashing, credential verification, login sessions, and auth tokens
pub mod auth;

/// Database, password policy, auth token, and connection configuration
pub mod config;

/// Environment variable names and defaults
pub mod constants;

/// Request-scoped data access layer
pub mod database;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Request parameter normalization
pub mod params;

/// Text and pagination helpers
pub mod text;
