// ABOUTME: HS256 bearer auth tokens: issuance for a user id and validation against the user store
// ABOUTME: Invalid, expired, or orphaned tokens validate to None; only infrastructure failures are errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! # Auth Tokens
//!
//! [`TokenManager::issue_token`] signs a [`TokenClaims`] set for a user id with the
//! configured secret. [`TokenManager::validate_token`] checks the signature, the
//! expiry and (when configured) the issuer, then confirms the subject still exists
//! in the credential store.

use crate::config::TokenConfig;
use crate::constants::{defaults, token_env};
use crate::database::users::user_exists;
use crate::database::{DataAccessProvider, RequestContext, UserId};
use crate::errors::{AppError, AppResult};
use jsonwebtoken::{decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey};
use jsonwebtoken::{Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use tracing::debug;

/// Claims carried by an auth token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer name
    pub iss: String,
    /// Issued at (seconds since the epoch)
    pub iat: u64,
    /// Expiry (seconds since the epoch)
    pub exp: u64,
    /// User id, as a decimal string
    pub sub: String,
    /// Always `bearer`
    pub token_type: String,
}

impl TokenClaims {
    /// Subject as a user id, if it parses
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok().map(UserId)
    }
}

/// Issues and validates auth tokens with one signing secret
#[derive(Clone)]
pub struct TokenManager {
    issuer: Option<String>,
    lifetime_secs: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenManager {
    /// Build a manager from validated settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid
    pub fn new(config: &TokenConfig) -> AppResult<Self> {
        config.validate()?;
        let secret = config.secret.as_bytes();
        Ok(Self {
            issuer: config.issuer.clone(),
            lifetime_secs: config.lifetime.as_secs(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Build a manager from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the secret is missing or a setting is malformed
    pub fn from_env() -> AppResult<Self> {
        Self::new(&TokenConfig::from_env()?)
    }

    /// Issuer written into new tokens, if configured
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Sign a token for `user_id`, valid for the configured lifetime
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no issuer is configured, or a crypto error if
    /// signing fails
    pub fn issue_token(&self, user_id: UserId) -> AppResult<String> {
        let issuer = self.issuer.as_deref().ok_or_else(|| {
            AppError::config(format!(
                "{} must be set to issue auth tokens",
                token_env::OAUTH_NAME
            ))
        })?;

        let issued = get_current_timestamp();
        let claims = TokenClaims {
            iss: issuer.to_owned(),
            iat: issued,
            exp: issued.saturating_add(self.lifetime_secs),
            sub: user_id.to_string(),
            token_type: defaults::TOKEN_TYPE.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::crypto(format!("failed to sign auth token: {e}")).with_source(e)
        })
    }

    /// Verify signature, expiry, and issuer; `None` for any invalid token
    #[must_use]
    pub fn decode_token(&self, token: &str) -> Option<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .inspect_err(|e| debug!(error = %e, "Auth token rejected"))
            .ok()
            .map(|data| data.claims)
    }

    /// Resolve a presented token to the user it was issued for
    ///
    /// Returns `Ok(None)` without touching the store when the token is absent or
    /// invalid, and `Ok(None)` when its subject no longer exists.
    ///
    /// # Errors
    ///
    /// Propagates configuration, connection, and query failures of the existence check
    pub async fn validate_token<D>(
        &self,
        store: &D,
        ctx: &mut RequestContext,
        token: Option<&str>,
    ) -> AppResult<Option<UserId>>
    where
        D: DataAccessProvider + ?Sized,
    {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let Some(user_id) = self.decode_token(token).and_then(|c| c.user_id()) else {
            return Ok(None);
        };

        if user_exists(store, ctx, user_id).await? {
            Ok(Some(user_id))
        } else {
            debug!(request_id = %ctx.id(), %user_id, "Auth token subject no longer exists");
            Ok(None)
        }
    }
}

impl Debug for TokenManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TokenManager")
            .field("issuer", &self.issuer)
            .field("lifetime_secs", &self.lifetime_secs)
            .field("keys", &"***")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(issuer: Option<&str>) -> TokenManager {
        TokenManager::new(&TokenConfig::new(
            "unit-test-secret",
            issuer.map(str::to_owned),
        ))
        .unwrap()
    }

    #[test]
    fn test_issued_claims() {
        let tokens = manager(Some("webtools"));
        let token = tokens.issue_token(UserId(9)).unwrap();
        let claims = tokens.decode_token(&token).unwrap();

        assert_eq!(claims.iss, "webtools");
        assert_eq!(claims.sub, "9");
        assert_eq!(claims.token_type, "bearer");
        assert_eq!(claims.exp - claims.iat, defaults::TOKEN_LIFETIME_SECS);
        assert_eq!(claims.user_id(), Some(UserId(9)));
    }

    #[test]
    fn test_missing_issuer_is_configuration_error() {
        let error = manager(None).issue_token(UserId(1)).unwrap_err();
        assert_eq!(error.code, crate::errors::ErrorCode::ConfigInvalid);
        assert!(error.message.contains("OAUTH_NAME"));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let token = manager(Some("other-app")).issue_token(UserId(1)).unwrap();
        assert_eq!(manager(Some("webtools")).decode_token(&token), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(manager(Some("webtools")).decode_token("not.a.jwt"), None);
    }

    #[test]
    fn test_debug_hides_keys() {
        let rendered = format!("{:?}", manager(Some("webtools")));
        assert!(!rendered.contains("unit-test-secret"));
    }
}
