// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides temp SQLite databases, a recording data access wrapper, and fast password policies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `webtools`

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tempfile::TempDir;
use webtools::auth::{PasswordContext, PasswordScheme};
use webtools::config::{Argon2Settings, DatabaseConfig, DatabaseUrl, HashAlgorithm, PasswordPolicy};
use webtools::database::users::create_user;
use webtools::database::{
    DataAccessProvider, Database, DatabaseError, Params, QueryResult, RequestContext, RowMap,
    SqlValue, UserId,
};

static INIT_LOGGER: Once = Once::new();

/// Schema of the credential store used by the tests
pub const CREATE_USER_TABLE: &str = r#"
    CREATE TABLE "user" (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT
    )
"#;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// A file-backed `SQLite` database that lives as long as this value
///
/// In-memory `SQLite` gives every connection its own database, so tests that open
/// more than one connection need a real file.
pub struct TestDatabase {
    pub database: Arc<Database>,
    _dir: TempDir,
}

impl TestDatabase {
    pub fn db(&self) -> &Database {
        &self.database
    }
}

/// Empty database file, no schema
pub fn create_empty_database() -> TestDatabase {
    init_test_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DatabaseConfig::new(DatabaseUrl::SQLite {
        path: dir.path().join("webtools-test.db"),
    });
    TestDatabase {
        database: Arc::new(Database::new(config)),
        _dir: dir,
    }
}

/// Database with the `"user"` table created
pub async fn create_test_database() -> TestDatabase {
    let test_db = create_empty_database();
    execute(test_db.db(), CREATE_USER_TABLE).await;
    test_db
}

/// Run a parameterless statement in its own context
pub async fn execute(db: &Database, statement: &str) {
    let mut ctx = RequestContext::new();
    db.run_write_query(&mut ctx, statement, Params::none(), false)
        .await
        .expect("Failed to execute statement");
    db.release_connection(&mut ctx).await;
}

/// Run a read query in its own context and return all rows
pub async fn fetch_all(db: &Database, query: &str, params: &[SqlValue]) -> Vec<RowMap> {
    let mut ctx = RequestContext::new();
    let rows = db
        .run_read_query(&mut ctx, query, params, false)
        .await
        .expect("Failed to run read query")
        .into_rows();
    db.release_connection(&mut ctx).await;
    rows
}

/// Database configuration that cannot produce a connection string
pub fn unconfigured_database() -> Database {
    Database::new(DatabaseConfig::new(DatabaseUrl::PostgreSQL {
        credentials: webtools::config::DatabaseCredentials::default(),
    }))
}

/// Cheap cost parameters so hashing stays fast in tests
pub fn fast_policy() -> PasswordPolicy {
    PasswordPolicy {
        scheme: HashAlgorithm::Argon2id,
        deprecated: vec![HashAlgorithm::Bcrypt],
        bcrypt_cost: 4,
        argon2: Argon2Settings {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        upgrade_weaker_parameters: true,
    }
}

pub fn fast_password_context() -> Arc<PasswordContext> {
    Arc::new(PasswordContext::new(fast_policy()).expect("Invalid test policy"))
}

/// Hash under the current (Argon2id) scheme of the fast policy
pub fn current_hash(password: &str) -> String {
    fast_password_context()
        .hash(password)
        .expect("Failed to hash password")
}

/// Hash under the legacy bcrypt scheme
pub fn legacy_bcrypt_hash(password: &str) -> String {
    bcrypt::hash(password, 4).expect("Failed to hash password")
}

/// Insert a user row and return its id
pub async fn insert_user(db: &Database, username: &str, password_hash: Option<&str>) -> UserId {
    let mut ctx = RequestContext::new();
    let user_id = if let Some(hash) = password_hash {
        create_user(db, &mut ctx, username, hash)
            .await
            .expect("Failed to create user")
    } else {
        let row = db
            .run_write_query(
                &mut ctx,
                r#"INSERT INTO "user" (username, password_hash) VALUES ($1, NULL) RETURNING id"#,
                Params::single([SqlValue::from(username)]),
                true,
            )
            .await
            .expect("Failed to create user")
            .expect("Insert returned no row");
        UserId(row.get("id").and_then(SqlValue::as_i64).expect("No id"))
    };
    db.release_connection(&mut ctx).await;
    user_id
}

/// Stored hash of a user, looked up by exact id
pub async fn stored_hash(db: &Database, user_id: UserId) -> Option<String> {
    fetch_all(
        db,
        r#"SELECT password_hash FROM "user" WHERE id = $1"#,
        &[SqlValue::Int(user_id.0)],
    )
    .await
    .first()
    .and_then(|row| row.get("password_hash"))
    .and_then(SqlValue::as_str)
    .map(str::to_owned)
}

/// Data access wrapper counting calls and optionally failing every write
pub struct RecordingDataAccess {
    inner: Arc<Database>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl RecordingDataAccess {
    pub fn new(inner: Arc<Database>) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn failing_writes(inner: Arc<Database>) -> Self {
        let recorder = Self::new(inner);
        recorder.fail_writes.store(true, Ordering::SeqCst);
        recorder
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataAccessProvider for RecordingDataAccess {
    async fn run_read_query(
        &self,
        ctx: &mut RequestContext,
        query: &str,
        params: &[SqlValue],
        single_row: bool,
    ) -> Result<QueryResult, DatabaseError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner
            .run_read_query(ctx, query, params, single_row)
            .await
    }

    async fn run_write_query(
        &self,
        ctx: &mut RequestContext,
        query: &str,
        params: Params,
        returning: bool,
    ) -> Result<Option<RowMap>, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query {
                context: "injected write failure".into(),
            });
        }
        self.inner
            .run_write_query(ctx, query, params, returning)
            .await
    }

    async fn release_connection(&self, ctx: &mut RequestContext) {
        self.inner.release_connection(ctx).await;
    }
}
