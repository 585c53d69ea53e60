// ABOUTME: User record lookups, existence checks, and password hash updates against the credential store
// ABOUTME: Works over any DataAccessProvider so the verifier can run against wrapped stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 webtools contributors

use super::{DataAccessProvider, DatabaseError, Params, RequestContext, RowMap, SqlValue};
use crate::constants::user_store;
use serde::Serialize;
use std::fmt;

/// Identity of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the `"user"` relation
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Primary key
    pub id: UserId,
    /// Username as stored (may carry surrounding whitespace)
    pub username: String,
    /// Encoded password hash; `None` when the column is null or empty
    pub password_hash: Option<String>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "***"))
            .finish()
    }
}

impl UserRecord {
    /// Build a record from a result row
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Query`] if `id` is missing or not an integer
    pub fn from_row(row: &RowMap) -> Result<Self, DatabaseError> {
        let id = row
            .get("id")
            .and_then(SqlValue::as_i64)
            .ok_or_else(|| DatabaseError::Query {
                context: "user row has no integer id column".into(),
            })?;
        Ok(Self {
            id: UserId(id),
            username: row
                .get("username")
                .and_then(SqlValue::as_str)
                .unwrap_or_default()
                .to_owned(),
            password_hash: row
                .get("password_hash")
                .and_then(SqlValue::as_str)
                .map(str::to_owned),
        })
    }
}

/// Fetch the first user whose trimmed username equals the trimmed `username`
///
/// # Errors
///
/// Propagates configuration, connection, and query failures
pub async fn find_user_by_username<D>(
    db: &D,
    ctx: &mut RequestContext,
    username: &str,
) -> Result<Option<UserRecord>, DatabaseError>
where
    D: DataAccessProvider + ?Sized,
{
    db.run_read_query(
        ctx,
        user_store::SELECT_BY_USERNAME,
        &[SqlValue::from(username)],
        true,
    )
    .await?
    .into_row()
    .map(|row| UserRecord::from_row(&row))
    .transpose()
}

/// Replace a user's stored password hash
///
/// # Errors
///
/// Propagates configuration, connection, and query failures; the update is rolled back on failure
pub async fn update_password_hash<D>(
    db: &D,
    ctx: &mut RequestContext,
    user_id: UserId,
    password_hash: &str,
) -> Result<(), DatabaseError>
where
    D: DataAccessProvider + ?Sized,
{
    db.run_write_query(
        ctx,
        user_store::UPDATE_PASSWORD_HASH,
        Params::single([SqlValue::from(password_hash), SqlValue::Int(user_id.0)]),
        false,
    )
    .await?;
    Ok(())
}

/// Whether a user with this id exists
///
/// # Errors
///
/// Propagates configuration, connection, and query failures
pub async fn user_exists<D>(
    db: &D,
    ctx: &mut RequestContext,
    user_id: UserId,
) -> Result<bool, DatabaseError>
where
    D: DataAccessProvider + ?Sized,
{
    Ok(db
        .run_read_query(ctx, user_store::SELECT_USER_ID, &[SqlValue::Int(user_id.0)], true)
        .await?
        .into_row()
        .is_some())
}

/// Insert a user with an already-encoded password hash and return its id
///
/// # Errors
///
/// Propagates failures, including unique-constraint violations as [`DatabaseError::Query`]
pub async fn create_user<D>(
    db: &D,
    ctx: &mut RequestContext,
    username: &str,
    password_hash: &str,
) -> Result<UserId, DatabaseError>
where
    D: DataAccessProvider + ?Sized,
{
    let row = db
        .run_write_query(
            ctx,
            user_store::INSERT_USER,
            Params::single([SqlValue::from(username), SqlValue::from(password_hash)]),
            true,
        )
        .await?
        .ok_or_else(|| DatabaseError::Query {
            context: "insert returned no row".into(),
        })?;
    Ok(UserRecord::from_row(&row)?.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_row() {
        let row = RowMap::from_pairs([
            ("id", SqlValue::Int(7)),
            ("username", SqlValue::from("alice")),
            ("password_hash", SqlValue::from("$2b$04$abc")),
        ]);
        let record = UserRecord::from_row(&row).unwrap();
        assert_eq!(record.id, UserId(7));
        assert_eq!(record.username, "alice");
        assert_eq!(record.password_hash.as_deref(), Some("$2b$04$abc"));
    }

    #[test]
    fn test_empty_hash_reads_as_none() {
        let row = RowMap::from_pairs([
            ("id", SqlValue::Int(1)),
            ("username", SqlValue::from("bob")),
            ("password_hash", SqlValue::from("")),
        ]);
        assert_eq!(UserRecord::from_row(&row).unwrap().password_hash, None);
    }

    #[test]
    fn test_missing_id_is_query_error() {
        let row = RowMap::from_pairs([("username", SqlValue::from("carol"))]);
        assert!(matches!(
            UserRecord::from_row(&row),
            Err(DatabaseError::Query { .. })
        ));
    }

    #[test]
    fn test_debug_hides_hash() {
        let record = UserRecord {
            id: UserId(1),
            username: "alice".into(),
            password_hash: Some("$argon2id$secret".into()),
        };
        assert!(!format!("{record:?}").contains("secret"));
    }
}
