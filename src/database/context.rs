// ABOUTME: Request-scoped context owning at most one lazily opened database connection
// ABOUTME: Passed explicitly to every data access call instead of ambient request state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use sqlx::AnyConnection;
use std::fmt;
use uuid::Uuid;

/// Lifetime scope of one inbound request or task execution
///
/// The context owns the connection bound to it. It is deliberately not `Clone`:
/// every data access call borrows it mutably, so overlapping queries on the same
/// connection cannot be expressed. Dropping the context closes its connection;
/// [`super::Database::release_connection`] does the same gracefully.
pub struct RequestContext {
    id: Uuid,
    pub(super) connection: Option<AnyConnection>,
    connections_opened: u32,
}

impl RequestContext {
    /// Create a context with a fresh id and no connection
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Create a context carrying an existing request id
    #[must_use]
    pub const fn with_id(id: Uuid) -> Self {
        Self {
            id,
            connection: None,
            connections_opened: 0,
        }
    }

    /// Request id, used as a tracing field
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Whether a connection is currently bound
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// How many connections this context has opened over its lifetime
    #[must_use]
    pub const fn connections_opened(&self) -> u32 {
        self.connections_opened
    }

    pub(super) fn bind(&mut self, connection: AnyConnection) {
        self.connections_opened += 1;
        self.connection = Some(connection);
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .field("connections_opened", &self.connections_opened)
            .finish()
    }
}
