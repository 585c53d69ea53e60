// ABOUTME: Signing secret, issuer name, and lifetime for bearer auth tokens
// ABOUTME: Loaded from the environment; the secret is redacted from Debug output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use crate::constants::{defaults, token_env};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

/// Settings for [`crate::auth::TokenManager`]
#[derive(Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// HMAC secret shared by issuance and validation
    pub secret: String,
    /// Value of the `iss` claim; issuing fails while this is unset
    pub issuer: Option<String>,
    /// Time from issuance to expiry
    pub lifetime: Duration,
}

impl TokenConfig {
    /// Config with the default seven-day lifetime
    #[must_use]
    pub fn new(secret: impl Into<String>, issuer: Option<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer,
            lifetime: Duration::from_secs(defaults::TOKEN_LIFETIME_SECS),
        }
    }

    /// Load token settings from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the secret is missing or the lifetime is not a number
    pub fn from_env() -> AppResult<Self> {
        let secret = env::var(token_env::SECRET_KEY)
            .map_err(|_| AppError::config(format!("{} is not set", token_env::SECRET_KEY)))?;
        let issuer = env::var(token_env::OAUTH_NAME)
            .ok()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        let mut config = Self::new(secret, issuer);
        if let Ok(raw) = env::var(token_env::TOKEN_LIFETIME_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|e| {
                AppError::config(format!("invalid {}: {e}", token_env::TOKEN_LIFETIME_SECS))
            })?;
            config.lifetime = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject an empty secret or a zero lifetime
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the invalid setting
    pub fn validate(&self) -> AppResult<()> {
        if self.secret.trim().is_empty() {
            return Err(AppError::config(format!(
                "{} must not be empty",
                token_env::SECRET_KEY
            )));
        }
        if self.lifetime.is_zero() {
            return Err(AppError::config("token lifetime must be positive"));
        }
        Ok(())
    }
}

impl Debug for TokenConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TokenConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
