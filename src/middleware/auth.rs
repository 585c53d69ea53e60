// ABOUTME: Login-required guard for axum routes backed by the session identity
// ABOUTME: Redirects to the configured login path when no SessionUser is in the request extensions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! Login Guard
//!
//! The session layer inserts a [`SessionUser`] into the request extensions for
//! logged-in requests. Routes wrapped with [`require_login`] only run when it is
//! present; everything else is redirected to the login page.
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use webtools::middleware::auth::{require_login, LoginGuard};
//!
//! # async fn dashboard() -> &'static str { "" }
//! let app: Router = Router::new()
//!     .route("/dashboard", get(dashboard))
//!     .layer(middleware::from_fn_with_state(LoginGuard::default(), require_login));
//! ```

use crate::auth::session::is_logged_in;
use crate::constants::defaults;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Where [`require_login`] sends anonymous requests
#[derive(Debug, Clone)]
pub struct LoginGuard {
    login_path: Arc<str>,
}

impl LoginGuard {
    /// Guard redirecting to `login_path`
    #[must_use]
    pub fn new(login_path: impl Into<Arc<str>>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    /// Redirect target
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl Default for LoginGuard {
    fn default() -> Self {
        Self::new(defaults::LOGIN_PATH)
    }
}

/// Run the inner handler only for logged-in requests
pub async fn require_login(
    State(guard): State<LoginGuard>,
    request: Request,
    next: Next,
) -> Response {
    if is_logged_in(request.extensions()) {
        return next.run(request).await;
    }

    debug!(
        path = %request.uri().path(),
        login_path = guard.login_path(),
        "Anonymous request redirected to login"
    );
    Redirect::to(guard.login_path()).into_response()
}
