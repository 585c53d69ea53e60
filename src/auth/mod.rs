// ABOUTME: Authentication: hashing schemes, credential verification, login sessions, and bearer tokens
// ABOUTME: Stored hashes of outdated schemes are upgraded transparently on successful login
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! # Authentication
//!
//! [`CredentialVerifier`] looks a user up through a
//! [`DataAccessProvider`](crate::database::DataAccessProvider), verifies the password
//! with a [`PasswordScheme`] and, when the stored hash is outdated, writes the
//! upgraded hash back in the same request context. [`LoginService`] turns a
//! successful verification into the [`SessionUser`] kept in the session.
//! [`TokenManager`] issues signed bearer tokens for API clients and resolves them
//! back to a user id.

pub mod credentials;
pub mod password;
pub mod session;
pub mod token;

pub use credentials::{CredentialVerifier, RehashFailureHook};
pub use password::{PasswordContext, PasswordScheme, VerifyOutcome};
pub use session::{is_logged_in, LoginService, SessionUser};
pub use token::{TokenClaims, TokenManager};
