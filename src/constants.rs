// ABOUTME: Environment variable names and default values shared across webtools modules
// ABOUTME: Centralizes database, password policy, token, logging, and credential-store constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! # Constants Module
//!
//! Environment variable names and defaults. Configuration is environment-only;
//! every `from_env` constructor reads the names defined here.

/// Database connection environment variables
pub mod database_env {
    /// Full database URL (`sqlite:` path or `postgres://` string), takes precedence
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// `PostgreSQL` host
    pub const DB_HOST: &str = "DB_HOST";
    /// `PostgreSQL` port
    pub const DB_PORT: &str = "DB_PORT";
    /// `PostgreSQL` database name
    pub const DB_NAME: &str = "DB_NAME";
    /// `PostgreSQL` user
    pub const DB_USER: &str = "DB_USER";
    /// `PostgreSQL` password
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
}

/// Password policy environment variables
pub mod password_env {
    /// Current hashing scheme (`argon2id` or `bcrypt`)
    pub const PASSWORD_SCHEME: &str = "PASSWORD_SCHEME";
    /// bcrypt work factor
    pub const BCRYPT_COST: &str = "BCRYPT_COST";
    /// Argon2 memory cost in KiB
    pub const ARGON2_MEMORY_KIB: &str = "ARGON2_MEMORY_KIB";
    /// Argon2 iteration count
    pub const ARGON2_ITERATIONS: &str = "ARGON2_ITERATIONS";
    /// Argon2 lanes
    pub const ARGON2_PARALLELISM: &str = "ARGON2_PARALLELISM";
}

/// Auth token environment variables
pub mod token_env {
    /// Secret used to sign and verify tokens (HS256)
    pub const SECRET_KEY: &str = "SECRET_KEY";
    /// Issuer name written into the `iss` claim
    pub const OAUTH_NAME: &str = "OAUTH_NAME";
    /// Token lifetime in seconds
    pub const TOKEN_LIFETIME_SECS: &str = "TOKEN_LIFETIME_SECS";
}

/// Logging environment variables
pub mod logging_env {
    /// Standard tracing filter directive
    pub const RUST_LOG: &str = "RUST_LOG";
    /// Output format: json, pretty, compact
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    /// Service name attached to startup logs
    pub const SERVICE_NAME: &str = "SERVICE_NAME";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Default values
pub mod defaults {
    /// Default service name for logs
    pub const SERVICE_NAME: &str = "webtools";
    /// Default login route for the login-required guard
    pub const LOGIN_PATH: &str = "/login";
    /// Auth tokens stay valid for seven days
    pub const TOKEN_LIFETIME_SECS: u64 = 7 * 24 * 60 * 60;
    /// Value of the `token_type` claim
    pub const TOKEN_TYPE: &str = "bearer";
    /// bcrypt cost used when hashing under the bcrypt scheme
    pub const BCRYPT_COST: u32 = 12;
    /// Lowest work factor bcrypt accepts
    pub const BCRYPT_MIN_COST: u32 = 4;
    /// Highest work factor bcrypt accepts
    pub const BCRYPT_MAX_COST: u32 = 31;
    /// Argon2 memory cost (KiB), matches `argon2::Params::DEFAULT_M_COST`
    pub const ARGON2_MEMORY_KIB: u32 = 19 * 1024;
    /// Argon2 iterations, matches `argon2::Params::DEFAULT_T_COST`
    pub const ARGON2_ITERATIONS: u32 = 2;
    /// Argon2 lanes, matches `argon2::Params::DEFAULT_P_COST`
    pub const ARGON2_PARALLELISM: u32 = 1;
}

/// Credential store queries. The relation is quoted because `user` is reserved in `PostgreSQL`.
pub mod user_store {
    /// Lookup by trimmed username on both sides of the comparison
    pub const SELECT_BY_USERNAME: &str = r#"
        SELECT id, username, password_hash
        FROM "user"
        WHERE TRIM(username) = TRIM($1)
    "#;

    /// Persist an upgraded password hash
    pub const UPDATE_PASSWORD_HASH: &str = r#"UPDATE "user" SET password_hash = $1 WHERE id = $2"#;

    /// Existence check for the subject of an auth token
    pub const SELECT_USER_ID: &str = r#"SELECT id FROM "user" WHERE id = $1"#;

    /// Insert a user and return its generated id
    pub const INSERT_USER: &str =
        r#"INSERT INTO "user" (username, password_hash) VALUES ($1, $2) RETURNING id"#;
}
