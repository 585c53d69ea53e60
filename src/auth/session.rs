// ABOUTME: Login flow on top of credential verification, producing the session identity
// ABOUTME: SessionUser is what the session layer stores and what the login guard looks for
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use super::credentials::CredentialVerifier;
use crate::database::{DataAccessProvider, RequestContext, UserId};
use crate::errors::AppResult;
use http::Extensions;
use serde::Serialize;

/// Identity stored in the session after a successful login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    /// Authenticated user
    pub user_id: UserId,
    /// Session should outlive the browser session
    pub permanent: bool,
}

impl SessionUser {
    /// A fresh, permanent session for `user_id`
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            permanent: true,
        }
    }
}

/// Login entry point for request handlers
#[derive(Debug, Clone)]
pub struct LoginService<D: ?Sized> {
    verifier: CredentialVerifier<D>,
}

impl<D> LoginService<D>
where
    D: DataAccessProvider + ?Sized,
{
    /// Wrap a credential verifier
    #[must_use]
    pub const fn new(verifier: CredentialVerifier<D>) -> Self {
        Self { verifier }
    }

    /// Underlying verifier
    #[must_use]
    pub const fn verifier(&self) -> &CredentialVerifier<D> {
        &self.verifier
    }

    /// Verify the credentials and build the session identity on success
    ///
    /// # Errors
    ///
    /// Propagates infrastructure failures from [`CredentialVerifier::authenticate`]
    pub async fn check_login(
        &self,
        ctx: &mut RequestContext,
        username: Option<&str>,
        password: Option<&str>,
    ) -> AppResult<Option<SessionUser>> {
        Ok(self
            .verifier
            .authenticate(ctx, username, password)
            .await?
            .map(SessionUser::new))
    }
}

/// Whether the request carries a logged-in session identity
#[must_use]
pub fn is_logged_in(extensions: &Extensions) -> bool {
    extensions.get::<SessionUser>().is_some()
}
