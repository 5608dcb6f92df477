// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outstanding sign-in challenges, one per wallet address.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::storage::database::{decode_row, read_row, write_row, Database, StoreResult, NONCES};

/// Stored challenge issued to a wallet address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonceRecord {
    pub wallet_address: String,
    pub nonce: String,
    /// Exact text the wallet is expected to sign.
    pub message: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NonceRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub struct NonceRepository<'a> {
    db: &'a Database,
}

impl<'a> NonceRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Store `record`, replacing any challenge already outstanding for the
    /// same address.
    pub fn put(&self, record: &NonceRecord) -> StoreResult<()> {
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(NONCES)?;
            write_row(&mut table, &record.wallet_address, record)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove and return the live challenge for `wallet_address`.
    ///
    /// The row is deleted whether or not it has expired; an expired row
    /// yields `None`.
    pub fn take(&self, wallet_address: &str, now: DateTime<Utc>) -> StoreResult<Option<NonceRecord>> {
        let write_txn = self.db.inner().begin_write()?;
        let record = {
            let mut table = write_txn.open_table(NONCES)?;
            let record: Option<NonceRecord> = read_row(&table, wallet_address)?;
            if record.is_some() {
                table.remove(wallet_address)?;
            }
            record
        };
        write_txn.commit()?;
        Ok(record.filter(|r| !r.is_expired(now)))
    }

    /// Delete every expired challenge. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let write_txn = self.db.inner().begin_write()?;
        let purged = {
            let mut table = write_txn.open_table(NONCES)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let record: NonceRecord = decode_row(value.value())?;
                if record.is_expired(now) {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                table.remove(key.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(purged)
    }
}
