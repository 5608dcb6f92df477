// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded application database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized UserRecord
//! - `wallets`: wallet_id → serialized WalletRecord
//! - `projects`: project_id → serialized ProjectRecord
//! - `nonces`: wallet address → serialized NonceRecord
//! - `wallet_address_index`: normalized address → wallet_id (unique)
//! - `user_wallet_index`: `user_id|wallet_id` → wallet_id
//! - `user_email_index`: lowercase email → user_id (unique)
//! - `user_username_index`: lowercase username → user_id (unique)
//! - `user_project_index`: `user_id|project_id` → project_id
//!
//! redb serializes write transactions, so any read-check-write sequence that
//! runs inside one write transaction is atomic with respect to other writers.

use std::path::Path;

use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata, Table, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
pub(crate) const WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");
pub(crate) const PROJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");
pub(crate) const NONCES: TableDefinition<&str, &[u8]> = TableDefinition::new("nonces");

pub(crate) const WALLET_ADDRESS_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("wallet_address_index");
pub(crate) const USER_WALLET_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_wallet_index");
pub(crate) const USER_EMAIL_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_email_index");
pub(crate) const USER_USERNAME_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_username_index");
pub(crate) const USER_PROJECT_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("user_project_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    /// A unique index already holds the value.
    #[error("{field} is already taken")]
    Conflict { field: &'static str },

    /// A column value outside its declared enumeration or domain.
    #[error("invalid value for {column}: {value:?}")]
    Constraint { column: &'static str, value: String },

    #[error("invalid update: {0}")]
    InvalidUpdate(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Row and Key Helpers
// =============================================================================

pub(crate) fn encode_row<T: Serialize>(row: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(row)?)
}

pub(crate) fn decode_row<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Load and decode one row of a primary table.
pub(crate) fn read_row<T: DeserializeOwned>(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &str,
) -> StoreResult<Option<T>> {
    match table.get(key)? {
        Some(value) => Ok(Some(decode_row(value.value())?)),
        None => Ok(None),
    }
}

/// Encode and store one row of a primary table.
pub(crate) fn write_row<T: Serialize>(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    key: &str,
    row: &T,
) -> StoreResult<()> {
    let bytes = encode_row(row)?;
    table.insert(key, bytes.as_slice())?;
    Ok(())
}

/// Look up a value in one of the string index tables.
pub(crate) fn read_index(
    table: &impl ReadableTable<&'static str, &'static str>,
    key: &str,
) -> StoreResult<Option<String>> {
    Ok(table.get(key)?.map(|value| value.value().to_string()))
}

/// Collect the child ids stored under `owner|*` in a per-user index.
pub(crate) fn scan_children(
    table: &impl ReadableTable<&'static str, &'static str>,
    owner_id: &str,
) -> StoreResult<Vec<String>> {
    let start = make_prefix(owner_id);
    let end = make_prefix_end(owner_id);
    let mut children = Vec::new();
    for entry in table.range(start.as_str()..end.as_str())? {
        let (_, child) = entry?;
        children.push(child.value().to_string());
    }
    Ok(children)
}

/// Composite key for the per-user index tables: `owner|child`.
pub(crate) fn make_index_key(owner_id: &str, child_id: &str) -> String {
    format!("{owner_id}|{child_id}")
}

/// Lower bound of a per-user range scan.
pub(crate) fn make_prefix(owner_id: &str) -> String {
    format!("{owner_id}|")
}

/// Upper bound of a per-user range scan.
///
/// Child ids are hyphenated UUIDs, so every key under the prefix sorts
/// below `~`.
pub(crate) fn make_prefix_end(owner_id: &str) -> String {
    format!("{owner_id}|~")
}

// =============================================================================
// Database
// =============================================================================

/// Row counts reported by the readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, ToSchema)]
pub struct TableCounts {
    pub users: u64,
    pub wallets: u64,
    pub projects: u64,
    pub nonces: u64,
}

/// Embedded ACID application database.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(
                    error = %e,
                    path = %parent.display(),
                    "Failed to create database directory"
                );
            }
        }
        let db = redb::Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(WALLETS)?;
            let _ = write_txn.open_table(PROJECTS)?;
            let _ = write_txn.open_table(NONCES)?;
            let _ = write_txn.open_table(WALLET_ADDRESS_INDEX)?;
            let _ = write_txn.open_table(USER_WALLET_INDEX)?;
            let _ = write_txn.open_table(USER_EMAIL_INDEX)?;
            let _ = write_txn.open_table(USER_USERNAME_INDEX)?;
            let _ = write_txn.open_table(USER_PROJECT_INDEX)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self { db })
    }

    pub(crate) fn inner(&self) -> &redb::Database {
        &self.db
    }

    /// Count rows in the primary tables. Doubles as a liveness check of the
    /// storage engine.
    pub fn counts(&self) -> StoreResult<TableCounts> {
        let read_txn = self.db.begin_read()?;
        Ok(TableCounts {
            users: read_txn.open_table(USERS)?.len()?,
            wallets: read_txn.open_table(WALLETS)?.len()?,
            projects: read_txn.open_table(PROJECTS)?.len()?,
            nonces: read_txn.open_table(NONCES)?.len()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_empty_tables() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("nested").join("app.redb")).unwrap();
        assert_eq!(
            db.counts().unwrap(),
            TableCounts {
                users: 0,
                wallets: 0,
                projects: 0,
                nonces: 0
            }
        );
    }

    #[test]
    fn reopen_preserves_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.redb");
        {
            let _db = Database::open(&path).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.counts().unwrap().users, 0);
    }

    #[test]
    fn prefix_bounds_enclose_uuid_children() {
        let owner = uuid::Uuid::new_v4().to_string();
        let child = uuid::Uuid::new_v4().to_string();
        let key = make_index_key(&owner, &child);
        assert!(key.as_str() > make_prefix(&owner).as_str());
        assert!(key.as_str() < make_prefix_end(&owner).as_str());
    }
}
