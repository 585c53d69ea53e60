// ABOUTME: HTTP middleware for axum routers built on the authentication layer
// ABOUTME: Provides the login-required guard and the bearer-token guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

pub mod auth;
pub mod token;

pub use auth::{require_login, LoginGuard};
pub use token::{require_token, TokenGuard, TokenUser};
