// ABOUTME: Bearer-token guard for axum API routes
// ABOUTME: Answers 401 unless the Authorization header carries a valid token for an existing user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! Token Guard
//!
//! Routes wrapped with [`require_token`] run only when the `Authorization` header
//! holds a token accepted by [`TokenManager::validate_token`]. The resolved
//! [`TokenUser`] is inserted into the request extensions for the handler.
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use std::sync::Arc;
//! use webtools::auth::TokenManager;
//! use webtools::config::DatabaseConfig;
//! use webtools::database::Database;
//! use webtools::middleware::token::{require_token, TokenGuard};
//!
//! # fn build() -> webtools::errors::AppResult<Router> {
//! # async fn profile() -> &'static str { "" }
//! let guard = TokenGuard::new(
//!     Arc::new(TokenManager::from_env()?),
//!     Arc::new(Database::new(DatabaseConfig::from_env()?)),
//! );
//! let app: Router = Router::new()
//!     .route("/api/profile", get(profile))
//!     .layer(middleware::from_fn_with_state(guard, require_token));
//! # Ok(app)
//! # }
//! ```

use crate::auth::TokenManager;
use crate::database::{DataAccessProvider, RequestContext, UserId};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

/// Message returned with every 401
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized access.";

/// User resolved from the request's bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUser(pub UserId);

/// State for [`require_token`]
#[derive(Clone)]
pub struct TokenGuard {
    tokens: Arc<TokenManager>,
    store: Arc<dyn DataAccessProvider>,
}

impl TokenGuard {
    /// Guard validating with `tokens` against `store`
    #[must_use]
    pub fn new(tokens: Arc<TokenManager>, store: Arc<dyn DataAccessProvider>) -> Self {
        Self { tokens, store }
    }
}

impl std::fmt::Debug for TokenGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGuard")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Token from an `Authorization` value; the `Bearer ` scheme prefix is optional
fn bearer_token(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value)
}

/// Run the inner handler only for requests with a valid bearer token
pub async fn require_token(
    State(guard): State<TokenGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(bearer_token);

    let mut ctx = RequestContext::new();
    let outcome = guard
        .tokens
        .validate_token(guard.store.as_ref(), &mut ctx, token)
        .await;
    guard.store.release_connection(&mut ctx).await;

    match outcome {
        Ok(Some(user_id)) => {
            request.extensions_mut().insert(TokenUser(user_id));
            next.run(request).await
        }
        Ok(None) => {
            debug!(
                path = %request.uri().path(),
                "Request without a valid auth token rejected"
            );
            (StatusCode::UNAUTHORIZED, Json(UNAUTHORIZED_MESSAGE)).into_response()
        }
        Err(error) => error.into_response(),
    }
}
