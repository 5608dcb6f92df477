// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Nonce Sweeper
//!
//! Background task that deletes expired sign-in nonces. Redemption already
//! rejects expired nonces; the sweep only keeps abandoned challenges from
//! accumulating in the database.
//!
//! ## Shutdown
//!
//! Stops when the shared `CancellationToken` is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::storage::{Database, NonceRepository};

pub struct NonceSweeper {
    db: Arc<Database>,
    interval: Duration,
}

impl NonceSweeper {
    pub fn new(db: Arc<Database>, interval: Duration) -> Self {
        Self { db, interval }
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Nonce sweeper starting");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Nonce sweeper shutting down");
                    return;
                }
            }

            self.sweep_step();
        }
    }

    /// Purge every expired nonce; returns how many were removed.
    pub fn sweep_step(&self) -> usize {
        match NonceRepository::new(&self.db).purge_expired(Utc::now()) {
            Ok(0) => 0,
            Ok(purged) => {
                debug!(purged, "Nonce sweeper: removed expired nonces");
                purged
            }
            Err(e) => {
                warn!(error = %e, "Nonce sweeper: purge failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NonceRecord;
    use tempfile::tempdir;

    fn nonce(address: &str, expires_in_secs: i64) -> NonceRecord {
        let now = Utc::now();
        NonceRecord {
            wallet_address: address.to_string(),
            nonce: "n".to_string(),
            message: "m".to_string(),
            issued_at: now,
            expires_at: now + chrono::Duration::seconds(expires_in_secs),
        }
    }

    #[test]
    fn sweep_removes_only_expired_nonces() {
        let dir = tempdir().unwrap();
        let db = Arc::new(Database::open(&dir.path().join("sweep.redb")).unwrap());
        let repo = NonceRepository::new(&db);
        repo.put(&nonce("stale-1", -10)).unwrap();
        repo.put(&nonce("stale-2", -1)).unwrap();
        repo.put(&nonce("live", 300)).unwrap();

        let sweeper = NonceSweeper::new(db.clone(), Duration::from_secs(60));
        assert_eq!(sweeper.sweep_step(), 2);
        assert_eq!(db.counts().unwrap().nonces, 1);
        assert_eq!(sweeper.sweep_step(), 0);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let dir = tempdir().unwrap();
        let db = Arc::new(Database::open(&dir.path().join("sweep.redb")).unwrap());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(NonceSweeper::new(db, Duration::from_secs(3600)).run(shutdown.clone()));
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
