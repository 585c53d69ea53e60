// ABOUTME: Request-scoped data access layer over sqlx's Any driver (PostgreSQL or SQLite)
// ABOUTME: Lazy per-context connections, read queries, and atomic write queries with rollback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

//! # Database Access
//!
//! [`Database`] executes parameterized SQL against a connection bound to an explicit
//! [`RequestContext`]. The connection is opened on first use, reused for the rest of
//! the context, and closed by [`Database::release_connection`] (or when the context
//! is dropped). Every result row is converted into a [`RowMap`] with empty strings
//! normalized to [`SqlValue::Null`].
//!
//! Writes run inside a transaction: they either commit completely or roll back
//! completely, including every parameter set of a batch.
//!
//! ```rust,no_run
//! use webtools::config::{DatabaseConfig, DatabaseUrl};
//! use webtools::database::{DataAccessProvider, Database, Params, RequestContext, SqlValue};
//!
//! # async fn example() -> Result<(), webtools::database::DatabaseError> {
//! let db = Database::new(DatabaseConfig::new(DatabaseUrl::parse_url("sqlite:app.db")));
//! let mut ctx = RequestContext::new();
//!
//! db.run_write_query(
//!     &mut ctx,
//!     "INSERT INTO note (body) VALUES ($1)",
//!     Params::single([SqlValue::from("hello")]),
//!     false,
//! )
//! .await?;
//! let notes = db
//!     .run_read_query(&mut ctx, "SELECT id, body FROM note", &[], false)
//!     .await?
//!     .into_rows();
//! assert!(!notes.is_empty());
//!
//! db.release_connection(&mut ctx).await;
//! # Ok(())
//! # }
//! ```

mod context;
mod errors;
mod rows;
/// User record queries for the credential store
pub mod users;

pub use context::RequestContext;
pub use errors::DatabaseError;
pub use rows::{row_to_map, RowMap, SqlValue};
pub use users::{UserId, UserRecord};

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use rows::bind_params;
use sqlx::{Any, AnyConnection, Connection, Transaction};
use tracing::{debug, error, info, warn};

/// Parameters for a write query
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// One parameter set, one execution
    Single(Vec<SqlValue>),
    /// The same statement applied to every set inside one transaction
    Batch(Vec<Vec<SqlValue>>),
}

impl Params {
    /// A single parameter set
    pub fn single<I: IntoIterator<Item = SqlValue>>(values: I) -> Self {
        Self::Single(values.into_iter().collect())
    }

    /// A statement without parameters
    #[must_use]
    pub const fn none() -> Self {
        Self::Single(Vec::new())
    }

    /// Whether this is a batch
    #[must_use]
    pub const fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }
}

impl From<Vec<SqlValue>> for Params {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::Single(values)
    }
}

/// Result of a read query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Full result set, in order
    Rows(Vec<RowMap>),
    /// `single_row` mode: the first row, or `None` for an empty result
    Row(Option<RowMap>),
}

impl QueryResult {
    /// All rows; a single-row result yields zero or one rows
    #[must_use]
    pub fn into_rows(self) -> Vec<RowMap> {
        match self {
            Self::Rows(rows) => rows,
            Self::Row(row) => row.into_iter().collect(),
        }
    }

    /// The first row, if any
    #[must_use]
    pub fn into_row(self) -> Option<RowMap> {
        match self {
            Self::Rows(rows) => rows.into_iter().next(),
            Self::Row(row) => row,
        }
    }
}

/// Query execution against a request-scoped connection
///
/// Implemented by [`Database`]; collaborators such as the credential verifier depend
/// on this trait so the store can be wrapped or substituted.
#[async_trait]
pub trait DataAccessProvider: Send + Sync {
    /// Execute a parameterized read query
    ///
    /// With `single_row` the result is [`QueryResult::Row`], otherwise [`QueryResult::Rows`].
    ///
    /// # Errors
    ///
    /// `Configuration`/`Connection` if no connection can be opened, `Query` if execution fails
    async fn run_read_query(
        &self,
        ctx: &mut RequestContext,
        query: &str,
        params: &[SqlValue],
        single_row: bool,
    ) -> Result<QueryResult, DatabaseError>;

    /// Execute a parameterized mutation inside a transaction
    ///
    /// With `returning`, yields the first row produced by the statement.
    ///
    /// # Errors
    ///
    /// `InvalidUsage` for `returning` with a batch (before any I/O), `Query` after rollback
    async fn run_write_query(
        &self,
        ctx: &mut RequestContext,
        query: &str,
        params: Params,
        returning: bool,
    ) -> Result<Option<RowMap>, DatabaseError>;

    /// Close the context's connection if one is bound; no-op otherwise
    async fn release_connection(&self, ctx: &mut RequestContext);
}

/// Data access layer bound to one configured database
#[derive(Debug, Clone)]
pub struct Database {
    config: DatabaseConfig,
}

impl Database {
    /// Create the access layer; no connection is opened until a context needs one
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        sqlx::any::install_default_drivers();
        Self { config }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Return the connection bound to `ctx`, opening and binding one if needed
    ///
    /// # Errors
    ///
    /// `Configuration` if required settings are missing, `Connection` if connect fails
    pub async fn acquire_connection<'c>(
        &self,
        ctx: &'c mut RequestContext,
    ) -> Result<&'c mut AnyConnection, DatabaseError> {
        if !ctx.is_connected() {
            let url = self.config.connection_string().inspect_err(|e| {
                error!(request_id = %ctx.id(), error = %e, "Database configuration incomplete");
            })?;
            let connection = AnyConnection::connect(&url).await.map_err(|e| {
                error!(
                    request_id = %ctx.id(),
                    target = %self.config.url,
                    error = %e,
                    "Failed to connect to database"
                );
                DatabaseError::connection(&e)
            })?;
            info!(request_id = %ctx.id(), target = %self.config.url, "Database connection opened");
            ctx.bind(connection);
        }

        ctx.connection
            .as_mut()
            .ok_or_else(|| DatabaseError::Connection {
                context: "connection was not bound to the request context".into(),
            })
    }

    async fn execute_write(
        tx: &mut Transaction<'_, Any>,
        query: &str,
        params: &Params,
        returning: bool,
    ) -> Result<Option<RowMap>, sqlx::Error> {
        match params {
            Params::Batch(sets) => {
                for set in sets {
                    bind_params(sqlx::query(query), set)
                        .execute(&mut **tx)
                        .await?;
                }
                Ok(None)
            }
            Params::Single(set) if returning => {
                let rows = bind_params(sqlx::query(query), set)
                    .fetch_all(&mut **tx)
                    .await?;
                rows.first().map(row_to_map).transpose()
            }
            Params::Single(set) => {
                bind_params(sqlx::query(query), set)
                    .execute(&mut **tx)
                    .await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl DataAccessProvider for Database {
    async fn run_read_query(
        &self,
        ctx: &mut RequestContext,
        query: &str,
        params: &[SqlValue],
        single_row: bool,
    ) -> Result<QueryResult, DatabaseError> {
        let request_id = ctx.id();
        let connection = self.acquire_connection(ctx).await?;

        let rows = bind_params(sqlx::query(query), params)
            .fetch_all(&mut *connection)
            .await
            .map_err(|e| {
                warn!(%request_id, error = %e, "Read query failed");
                DatabaseError::query(&e)
            })?;
        let rows = rows
            .iter()
            .map(row_to_map)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::query(&e))?;

        debug!(%request_id, rows = rows.len(), single_row, "Read query completed");
        Ok(if single_row {
            QueryResult::Row(rows.into_iter().next())
        } else {
            QueryResult::Rows(rows)
        })
    }

    async fn run_write_query(
        &self,
        ctx: &mut RequestContext,
        query: &str,
        params: Params,
        returning: bool,
    ) -> Result<Option<RowMap>, DatabaseError> {
        if returning && params.is_batch() {
            return Err(DatabaseError::InvalidUsage {
                context: "cannot return rows from a batch write".into(),
            });
        }

        let request_id = ctx.id();
        let connection = self.acquire_connection(ctx).await?;
        let mut tx = connection.begin().await.map_err(|e| {
            warn!(%request_id, error = %e, "Failed to begin transaction");
            DatabaseError::query(&e)
        })?;

        match Self::execute_write(&mut tx, query, &params, returning).await {
            Ok(row) => {
                tx.commit().await.map_err(|e| {
                    warn!(%request_id, error = %e, "Commit failed");
                    DatabaseError::query(&e)
                })?;
                debug!(%request_id, batch = params.is_batch(), "Write query committed");
                Ok(row)
            }
            Err(e) => {
                warn!(%request_id, error = %e, "Write query failed, rolling back");
                if let Err(rollback_error) = tx.rollback().await {
                    error!(%request_id, error = %rollback_error, "Rollback failed");
                }
                Err(DatabaseError::query(&e))
            }
        }
    }

    async fn release_connection(&self, ctx: &mut RequestContext) {
        let Some(connection) = ctx.connection.take() else {
            return;
        };
        match connection.close().await {
            Ok(()) => debug!(request_id = %ctx.id(), "Database connection closed"),
            Err(e) => warn!(request_id = %ctx.id(), error = %e, "Error while closing connection"),
        }
    }
}
