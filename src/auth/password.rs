// ABOUTME: Password hashing context with bcrypt (legacy) and Argon2id (current) schemes
// ABOUTME: Verifies stored hashes and produces an upgraded hash when the stored one is outdated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use crate::config::{HashAlgorithm, PasswordPolicy};
use crate::errors::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::{debug, error, warn};

/// Result of verifying a password against a stored hash
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerifyOutcome {
    /// Whether the password matched
    pub valid: bool,
    /// Replacement hash when the password matched an outdated hash
    pub upgraded_hash: Option<String>,
}

impl VerifyOutcome {
    const fn rejected() -> Self {
        Self {
            valid: false,
            upgraded_hash: None,
        }
    }
}

/// Pluggable password hashing scheme
///
/// Implementations are synchronous and CPU-bound; async callers run them on
/// `tokio::task::spawn_blocking`.
pub trait PasswordScheme: Send + Sync {
    /// Verify `password` against `hash`; on a match with an outdated hash, also return
    /// a fresh hash under the current scheme
    ///
    /// Unknown, unaccepted or malformed hashes verify as invalid.
    ///
    /// # Errors
    ///
    /// Reserved for failures of the hashing backend itself
    fn verify_and_update(&self, password: &str, hash: &str) -> AppResult<VerifyOutcome>;

    /// Hash `password` under the current scheme
    ///
    /// # Errors
    ///
    /// Returns a crypto error if the hashing backend fails
    fn hash(&self, password: &str) -> AppResult<String>;
}

/// [`PasswordScheme`] driven by a [`PasswordPolicy`]
#[derive(Debug, Clone)]
pub struct PasswordContext {
    policy: PasswordPolicy,
}

impl PasswordContext {
    /// Create a context for a validated policy
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the policy's cost parameters are invalid
    pub fn new(policy: PasswordPolicy) -> AppResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Policy in use
    #[must_use]
    pub const fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    fn argon2(&self) -> AppResult<Argon2<'static>> {
        let settings = self.policy.argon2;
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| AppError::config(format!("invalid argon2 parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn hash_with(&self, algorithm: HashAlgorithm, password: &str) -> AppResult<String> {
        match algorithm {
            HashAlgorithm::Bcrypt => bcrypt::hash(password, self.policy.bcrypt_cost)
                .map_err(|e| AppError::crypto(format!("bcrypt hashing failed: {e}"))),
            HashAlgorithm::Argon2id => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = self
                    .argon2()?
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| AppError::crypto(format!("Argon2 password hashing failed: {e}")))?;
                Ok(hash.to_string())
            }
        }
    }

    fn verify_with(algorithm: HashAlgorithm, password: &str, hash: &str) -> bool {
        match algorithm {
            HashAlgorithm::Bcrypt => bcrypt::verify(password, hash).unwrap_or_else(|e| {
                warn!(error = %e, "Malformed bcrypt hash");
                false
            }),
            HashAlgorithm::Argon2id => {
                let Ok(parsed) = PasswordHash::new(hash).inspect_err(|e| {
                    warn!(error = %e, "Failed to parse stored password hash");
                }) else {
                    return false;
                };
                // Parameters are taken from the encoded hash, not from the policy
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            }
        }
    }

    /// Whether a verified hash should be replaced
    fn needs_update(&self, algorithm: HashAlgorithm, hash: &str) -> bool {
        if algorithm != self.policy.scheme {
            return true;
        }
        if !self.policy.upgrade_weaker_parameters {
            return false;
        }
        match algorithm {
            HashAlgorithm::Bcrypt => {
                bcrypt_cost(hash).is_none_or(|cost| cost < self.policy.bcrypt_cost)
            }
            HashAlgorithm::Argon2id => {
                let Ok(parsed) = PasswordHash::new(hash) else {
                    return true;
                };
                let Ok(params) = Params::try_from(&parsed) else {
                    return true;
                };
                let wanted = self.policy.argon2;
                parsed.version != Some(Version::V0x13.into())
                    || params.m_cost() < wanted.memory_kib
                    || params.t_cost() < wanted.iterations
                    || params.p_cost() < wanted.parallelism
            }
        }
    }
}

impl PasswordScheme for PasswordContext {
    fn verify_and_update(&self, password: &str, hash: &str) -> AppResult<VerifyOutcome> {
        let Some(algorithm) = HashAlgorithm::identify(hash) else {
            warn!("Stored password hash uses an unknown scheme");
            return Ok(VerifyOutcome::rejected());
        };
        if !self.policy.accepts(algorithm) {
            warn!(algorithm = %algorithm, "Stored password hash uses a scheme the policy does not accept");
            return Ok(VerifyOutcome::rejected());
        }
        if !Self::verify_with(algorithm, password, hash) {
            return Ok(VerifyOutcome::rejected());
        }

        if !self.needs_update(algorithm, hash) {
            return Ok(VerifyOutcome {
                valid: true,
                upgraded_hash: None,
            });
        }

        debug!(from = %algorithm, to = %self.policy.scheme, "Password hash is outdated");
        // The password already matched; a failed rehash only postpones the upgrade
        let upgraded_hash = self
            .hash(password)
            .inspect_err(|e| error!(error = %e, "Failed to compute upgraded password hash"))
            .ok();
        Ok(VerifyOutcome {
            valid: true,
            upgraded_hash,
        })
    }

    fn hash(&self, password: &str) -> AppResult<String> {
        self.hash_with(self.policy.scheme, password)
    }
}

/// Work factor of a modular-crypt bcrypt hash (`$2b$<cost>$...`)
fn bcrypt_cost(hash: &str) -> Option<u32> {
    hash.split('$').nth(2)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2Settings;

    fn fast_policy() -> PasswordPolicy {
        PasswordPolicy {
            bcrypt_cost: 4,
            argon2: Argon2Settings {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..PasswordPolicy::default()
        }
    }

    #[test]
    fn test_bcrypt_cost_parsing() {
        assert_eq!(bcrypt_cost("$2b$12$abcdefghijklmnopqrstuv"), Some(12));
        assert_eq!(bcrypt_cost("$2b$xx$abc"), None);
        assert_eq!(bcrypt_cost("garbage"), None);
    }

    #[test]
    fn test_current_hash_needs_no_update() {
        let context = PasswordContext::new(fast_policy()).unwrap();
        let hash = context.hash("secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let outcome = context.verify_and_update("secret", &hash).unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.upgraded_hash, None);
    }

    #[test]
    fn test_weaker_argon2_parameters_are_upgraded() {
        let weak = PasswordContext::new(fast_policy()).unwrap();
        let hash = weak.hash("secret").unwrap();

        let mut stronger = fast_policy();
        stronger.argon2.iterations = 2;
        let context = PasswordContext::new(stronger).unwrap();
        let outcome = context.verify_and_update("secret", &hash).unwrap();
        assert!(outcome.valid);
        assert!(outcome.upgraded_hash.is_some());

        let mut relaxed = fast_policy();
        relaxed.argon2.iterations = 2;
        relaxed.upgrade_weaker_parameters = false;
        let context = PasswordContext::new(relaxed).unwrap();
        let outcome = context.verify_and_update("secret", &hash).unwrap();
        assert!(outcome.valid);
        assert_eq!(outcome.upgraded_hash, None);
    }

    #[test]
    fn test_unaccepted_scheme_is_rejected() {
        let legacy = bcrypt::hash("secret", 4).unwrap();
        let policy = PasswordPolicy {
            deprecated: Vec::new(),
            ..fast_policy()
        };
        let context = PasswordContext::new(policy).unwrap();
        assert!(!context.verify_and_update("secret", &legacy).unwrap().valid);
    }
}
