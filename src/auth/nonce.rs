// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in challenges.
//!
//! A wallet asks for a nonce, signs [`login_message`] with it, and presents
//! the signature together with the message. Each nonce is durable, expires
//! after the configured TTL and is consumed by the first verification
//! attempt, successful or not.

use chrono::Utc;
use rand::Rng;

use crate::storage::{Database, NonceRecord, NonceRepository, StoreError, StoreResult};

/// Fixed prefix of the message a wallet signs.
pub const LOGIN_MESSAGE_PREFIX: &str = "Sign this message to authenticate with dApp0:\n\n";

const NONCE_LEN: usize = 32;
const NONCE_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random alphanumeric nonce.
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LEN)
        .map(|_| NONCE_CHARSET[rng.gen_range(0..NONCE_CHARSET.len())] as char)
        .collect()
}

/// The exact text a wallet must sign for `nonce`.
pub fn login_message(nonce: &str) -> String {
    format!("{LOGIN_MESSAGE_PREFIX}{nonce}")
}

#[derive(Debug, thiserror::Error)]
pub enum NonceError {
    #[error("No active nonce for this wallet address")]
    NotIssued,

    #[error("Message does not match the issued nonce")]
    MessageMismatch,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues and redeems challenges with a fixed lifetime.
#[derive(Debug, Clone)]
pub struct NonceIssuer {
    ttl: chrono::Duration,
}

impl NonceIssuer {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Issue a fresh challenge for `wallet_address`, replacing any
    /// outstanding one.
    pub fn issue(&self, db: &Database, wallet_address: &str) -> StoreResult<NonceRecord> {
        let nonce = generate_nonce();
        let issued_at = Utc::now();
        let record = NonceRecord {
            wallet_address: wallet_address.to_string(),
            message: login_message(&nonce),
            nonce,
            issued_at,
            expires_at: issued_at
                .checked_add_signed(self.ttl)
                .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC),
        };
        NonceRepository::new(db).put(&record)?;
        Ok(record)
    }

    /// Consume the challenge for `wallet_address` and check that
    /// `presented_message` is the one it was issued with.
    pub fn redeem(
        &self,
        db: &Database,
        wallet_address: &str,
        presented_message: &str,
    ) -> Result<NonceRecord, NonceError> {
        let record = NonceRepository::new(db)
            .take(wallet_address, Utc::now())?
            .ok_or(NonceError::NotIssued)?;
        if record.message != presented_message {
            return Err(NonceError::MessageMismatch);
        }
        Ok(record)
    }
}
