// ABOUTME: Password hashing policy passed explicitly to the password context
// ABOUTME: Names the current algorithm, deprecated algorithms, and cost parameters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use crate::constants::{defaults, password_env};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Password hashing algorithms understood by [`crate::auth::PasswordContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// bcrypt (`$2b$`, `$2a$`, `$2y$` prefixes)
    Bcrypt,
    /// Argon2id PHC strings (`$argon2id$`)
    Argon2id,
}

impl HashAlgorithm {
    /// Detect the algorithm from an encoded hash
    #[must_use]
    pub fn identify(encoded: &str) -> Option<Self> {
        if encoded.starts_with("$argon2id$") {
            Some(Self::Argon2id)
        } else if ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|prefix| encoded.starts_with(prefix))
        {
            Some(Self::Bcrypt)
        } else {
            None
        }
    }

    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bcrypt => "bcrypt",
            Self::Argon2id => "argon2id",
        }
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(Self::Bcrypt),
            "argon2id" | "argon2" => Ok(Self::Argon2id),
            other => Err(AppError::config(format!(
                "unsupported password scheme: {other}"
            ))),
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Settings {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for Argon2Settings {
    fn default() -> Self {
        Self {
            memory_kib: defaults::ARGON2_MEMORY_KIB,
            iterations: defaults::ARGON2_ITERATIONS,
            parallelism: defaults::ARGON2_PARALLELISM,
        }
    }
}

/// Explicit password hashing configuration
///
/// Hashes produced under `scheme` with the configured costs are current. Hashes of a
/// `deprecated` algorithm still verify but are flagged for upgrade; when
/// `upgrade_weaker_parameters` is set, current-algorithm hashes with lower costs are
/// flagged too. Any other algorithm is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Algorithm for new hashes
    pub scheme: HashAlgorithm,
    /// Algorithms accepted for verification and upgraded on success
    pub deprecated: Vec<HashAlgorithm>,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Argon2id parameters
    pub argon2: Argon2Settings,
    /// Rehash current-algorithm hashes whose costs are below the configured ones
    pub upgrade_weaker_parameters: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            scheme: HashAlgorithm::Argon2id,
            deprecated: vec![HashAlgorithm::Bcrypt],
            bcrypt_cost: defaults::BCRYPT_COST,
            argon2: Argon2Settings::default(),
            upgrade_weaker_parameters: true,
        }
    }
}

impl PasswordPolicy {
    /// Load the policy from environment variables, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable or out-of-range value
    pub fn from_env() -> AppResult<Self> {
        let mut policy = Self::default();

        if let Ok(raw) = env::var(password_env::PASSWORD_SCHEME) {
            policy.scheme = raw.parse()?;
            // Whatever is not current stays verifiable
            policy.deprecated = [HashAlgorithm::Bcrypt, HashAlgorithm::Argon2id]
                .into_iter()
                .filter(|alg| *alg != policy.scheme)
                .collect();
        }
        policy.bcrypt_cost = env_u32(password_env::BCRYPT_COST, policy.bcrypt_cost)?;
        policy.argon2.memory_kib =
            env_u32(password_env::ARGON2_MEMORY_KIB, policy.argon2.memory_kib)?;
        policy.argon2.iterations =
            env_u32(password_env::ARGON2_ITERATIONS, policy.argon2.iterations)?;
        policy.argon2.parallelism =
            env_u32(password_env::ARGON2_PARALLELISM, policy.argon2.parallelism)?;

        policy.validate()?;
        Ok(policy)
    }

    /// Check cost parameters against the algorithm limits
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid parameter
    pub fn validate(&self) -> AppResult<()> {
        if !(defaults::BCRYPT_MIN_COST..=defaults::BCRYPT_MAX_COST).contains(&self.bcrypt_cost) {
            return Err(AppError::config(format!(
                "bcrypt cost {} outside {}..={}",
                self.bcrypt_cost,
                defaults::BCRYPT_MIN_COST,
                defaults::BCRYPT_MAX_COST
            )));
        }
        argon2::Params::new(
            self.argon2.memory_kib,
            self.argon2.iterations,
            self.argon2.parallelism,
            None,
        )
        .map_err(|e| AppError::config(format!("invalid argon2 parameters: {e}")))?;
        Ok(())
    }

    /// Whether hashes of `algorithm` are accepted at all
    #[must_use]
    pub fn accepts(&self, algorithm: HashAlgorithm) -> bool {
        algorithm == self.scheme || self.deprecated.contains(&algorithm)
    }
}

fn env_u32(name: &str, default: u32) -> AppResult<u32> {
    env::var(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| AppError::config(format!("invalid {name}: {e}")))
    })
}
