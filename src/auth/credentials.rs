// ABOUTME: Credential verification against the user store with transparent hash upgrades
// ABOUTME: Looks up by trimmed username, verifies off the async executor, persists rehashes best-effort
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use super::password::{PasswordScheme, VerifyOutcome};
use crate::database::users::{find_user_by_username, update_password_hash};
use crate::database::{DataAccessProvider, DatabaseError, RequestContext, UserId};
use crate::errors::{AppError, AppResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Callback invoked when an upgraded hash could not be persisted
pub type RehashFailureHook = Arc<dyn Fn(UserId, &DatabaseError) + Send + Sync>;

/// Verifies submitted credentials against stored password hashes
///
/// A wrong password and an unknown username both yield `Ok(None)`; only
/// infrastructure failures during the lookup surface as errors.
pub struct CredentialVerifier<D: ?Sized> {
    store: Arc<D>,
    passwords: Arc<dyn PasswordScheme>,
    on_rehash_failure: Option<RehashFailureHook>,
}

impl<D: ?Sized> Clone for CredentialVerifier<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            passwords: Arc::clone(&self.passwords),
            on_rehash_failure: self.on_rehash_failure.clone(),
        }
    }
}

impl<D: ?Sized> fmt::Debug for CredentialVerifier<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("rehash_failure_hook", &self.on_rehash_failure.is_some())
            .finish_non_exhaustive()
    }
}

impl<D> CredentialVerifier<D>
where
    D: DataAccessProvider + ?Sized,
{
    /// Create a verifier over a user store and a password scheme
    #[must_use]
    pub fn new(store: Arc<D>, passwords: Arc<dyn PasswordScheme>) -> Self {
        Self {
            store,
            passwords,
            on_rehash_failure: None,
        }
    }

    /// Report failed hash upgrades to `hook` in addition to the error log
    #[must_use]
    pub fn with_rehash_failure_hook(mut self, hook: RehashFailureHook) -> Self {
        self.on_rehash_failure = Some(hook);
        self
    }

    /// Password scheme in use
    #[must_use]
    pub fn password_scheme(&self) -> &dyn PasswordScheme {
        self.passwords.as_ref()
    }

    /// Authenticate a username/password pair
    ///
    /// Missing input returns `Ok(None)` without touching the store. On success with an
    /// outdated stored hash, the upgraded hash is written back; a failure of that write
    /// is logged and reported to the rehash hook but does not change the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the user lookup fails (configuration, connection or query)
    /// or the verification task cannot be joined
    pub async fn authenticate(
        &self,
        ctx: &mut RequestContext,
        username: Option<&str>,
        password: Option<&str>,
    ) -> AppResult<Option<UserId>> {
        let (Some(username), Some(password)) = (username, password) else {
            debug!(request_id = %ctx.id(), "Authentication skipped: missing credentials");
            return Ok(None);
        };
        let username = username.trim();

        let Some(user) = find_user_by_username(self.store.as_ref(), ctx, username).await? else {
            info!(request_id = %ctx.id(), username, "Authentication failed");
            return Ok(None);
        };

        let Some(stored_hash) = user
            .password_hash
            .as_deref()
            .map(str::trim)
            .filter(|hash| !hash.is_empty())
        else {
            warn!(request_id = %ctx.id(), user_id = %user.id, "User has no password hash");
            return Ok(None);
        };

        let outcome = self.verify(password.trim(), stored_hash).await?;
        if !outcome.valid {
            info!(request_id = %ctx.id(), username, "Authentication failed");
            return Ok(None);
        }

        if let Some(upgraded_hash) = outcome.upgraded_hash {
            self.persist_upgraded_hash(ctx, user.id, &upgraded_hash).await;
        }

        info!(request_id = %ctx.id(), user_id = %user.id, "User authenticated");
        Ok(Some(user.id))
    }

    async fn verify(&self, password: &str, stored_hash: &str) -> AppResult<VerifyOutcome> {
        let scheme = Arc::clone(&self.passwords);
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        tokio::task::spawn_blocking(move || scheme.verify_and_update(&password, &stored_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }

    async fn persist_upgraded_hash(&self, ctx: &mut RequestContext, user_id: UserId, hash: &str) {
        match update_password_hash(self.store.as_ref(), ctx, user_id, hash).await {
            Ok(()) => info!(request_id = %ctx.id(), %user_id, "Upgraded stored password hash"),
            Err(e) => {
                error!(
                    request_id = %ctx.id(),
                    %user_id,
                    error = %e,
                    "Failed to persist upgraded password hash"
                );
                if let Some(hook) = &self.on_rehash_failure {
                    hook(user_id, &e);
                }
            }
        }
    }
}
