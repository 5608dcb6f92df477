// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User and wallet repository.
//!
//! A user is created the first time an unknown wallet signs in, together with
//! that wallet. Wallet addresses are unique across all users; emails and
//! usernames are unique case-insensitively.
//!
//! ## Tables
//!
//! ```text
//! users                 user_id            → UserRecord
//! wallets               wallet_id          → WalletRecord
//! wallet_address_index  normalized address → wallet_id
//! user_wallet_index     user_id|wallet_id  → wallet_id
//! user_email_index      lowercase email    → user_id
//! user_username_index   lowercase username → user_id
//! ```

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable, Table};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::chains::ChainType;
use crate::storage::database::{
    make_index_key, read_index, read_row, scan_children, write_row, Database, StoreError,
    StoreResult, USERS, USER_EMAIL_INDEX, USER_USERNAME_INDEX, USER_WALLET_INDEX, WALLETS,
    WALLET_ADDRESS_INDEX,
};

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
const EMAIL_MAX_LEN: usize = 254;

/// Stored user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub github_username: Option<String>,
    /// Never leaves the server.
    pub github_access_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: None,
            username: None,
            avatar_url: None,
            github_username: None,
            github_access_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True until both email and username are set.
    pub fn needs_profile_setup(&self) -> bool {
        self.email.is_none() || self.username.is_none()
    }
}

/// Stored wallet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WalletRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_address: String,
    pub chain_type: ChainType,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// A user together with every wallet bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub user: UserRecord,
    pub wallets: Vec<WalletRecord>,
}

/// Partial profile update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.avatar_url.is_none()
    }
}

/// Repository for users and their wallets.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Return the user owning `address`, creating user and wallet if the
    /// address has never been seen.
    ///
    /// Lookup and insert share one write transaction, so two concurrent
    /// first sign-ins of the same address yield a single user. The boolean
    /// is `true` when the user was created by this call.
    pub fn resolve_wallet_identity(
        &self,
        address: &str,
        chain: ChainType,
    ) -> StoreResult<(UserIdentity, bool)> {
        let normalized = chain.normalize_address(address);
        if normalized.is_empty() {
            return Err(StoreError::Constraint {
                column: "wallet_address",
                value: address.to_string(),
            });
        }

        let write_txn = self.db.inner().begin_write()?;
        let resolved = {
            let mut users = write_txn.open_table(USERS)?;
            let mut wallets = write_txn.open_table(WALLETS)?;
            let mut address_index = write_txn.open_table(WALLET_ADDRESS_INDEX)?;
            let mut user_wallets = write_txn.open_table(USER_WALLET_INDEX)?;

            match read_index(&address_index, &normalized)? {
                Some(wallet_id) => {
                    let wallet: WalletRecord = read_row(&wallets, &wallet_id)?
                        .ok_or_else(|| StoreError::NotFound(format!("Wallet {wallet_id}")))?;
                    let identity = load_identity(&users, &wallets, &user_wallets, wallet.user_id)?
                        .ok_or_else(|| StoreError::NotFound(format!("User {}", wallet.user_id)))?;
                    (identity, false)
                }
                None => {
                    let now = Utc::now();
                    let user = UserRecord::new(Uuid::new_v4(), now);
                    let wallet = WalletRecord {
                        id: Uuid::new_v4(),
                        user_id: user.id,
                        wallet_address: normalized.clone(),
                        chain_type: chain,
                        is_primary: true,
                        created_at: now,
                    };

                    let user_key = user.id.to_string();
                    let wallet_key = wallet.id.to_string();
                    write_row(&mut users, &user_key, &user)?;
                    write_row(&mut wallets, &wallet_key, &wallet)?;
                    address_index.insert(normalized.as_str(), wallet_key.as_str())?;
                    user_wallets.insert(
                        make_index_key(&user_key, &wallet_key).as_str(),
                        wallet_key.as_str(),
                    )?;

                    tracing::info!(
                        user_id = %user.id,
                        chain = %chain,
                        "Created user for new wallet"
                    );
                    (
                        UserIdentity {
                            user,
                            wallets: vec![wallet],
                        },
                        true,
                    )
                }
            }
        };
        write_txn.commit()?;
        Ok(resolved)
    }

    pub fn get(&self, user_id: Uuid) -> StoreResult<Option<UserRecord>> {
        let read_txn = self.db.inner().begin_read()?;
        let users = read_txn.open_table(USERS)?;
        read_row(&users, &user_id.to_string())
    }

    /// User row plus wallets.
    pub fn get_identity(&self, user_id: Uuid) -> StoreResult<Option<UserIdentity>> {
        let read_txn = self.db.inner().begin_read()?;
        let users = read_txn.open_table(USERS)?;
        let wallets = read_txn.open_table(WALLETS)?;
        let user_wallets = read_txn.open_table(USER_WALLET_INDEX)?;
        load_identity(&users, &wallets, &user_wallets, user_id)
    }

    /// Apply a profile update, enforcing email and username uniqueness.
    pub fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> StoreResult<UserRecord> {
        if update.is_empty() {
            return Err(StoreError::InvalidUpdate("No fields to update".to_string()));
        }
        let email = update.email.as_deref().map(validate_email).transpose()?;
        let username = update.username.as_deref().map(validate_username).transpose()?;
        let avatar_url = update.avatar_url.as_deref().map(validate_avatar_url).transpose()?;

        let user_key = user_id.to_string();
        let write_txn = self.db.inner().begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut user: UserRecord = read_row(&users, &user_key)?
                .ok_or_else(|| StoreError::NotFound(format!("User {user_id}")))?;

            if let Some(email) = email {
                let mut index = write_txn.open_table(USER_EMAIL_INDEX)?;
                claim_unique(&mut index, "email", user.email.as_deref(), &email, &user_key)?;
                user.email = Some(email);
            }
            if let Some(username) = username {
                let mut index = write_txn.open_table(USER_USERNAME_INDEX)?;
                claim_unique(
                    &mut index,
                    "username",
                    user.username.as_deref(),
                    &username,
                    &user_key,
                )?;
                user.username = Some(username);
            }
            if let Some(avatar_url) = avatar_url {
                user.avatar_url = Some(avatar_url);
            }

            user.updated_at = Utc::now();
            write_row(&mut users, &user_key, &user)?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Store the GitHub login and token used for exports.
    pub fn set_github_credentials(
        &self,
        user_id: Uuid,
        github_username: &str,
        access_token: &str,
    ) -> StoreResult<UserRecord> {
        let github_username = github_username.trim();
        let access_token = access_token.trim();
        if github_username.is_empty() {
            return Err(StoreError::Constraint {
                column: "github_username",
                value: github_username.to_string(),
            });
        }
        if access_token.is_empty() {
            return Err(StoreError::Constraint {
                column: "github_access_token",
                value: String::new(),
            });
        }

        let user_key = user_id.to_string();
        let write_txn = self.db.inner().begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut user: UserRecord = read_row(&users, &user_key)?
                .ok_or_else(|| StoreError::NotFound(format!("User {user_id}")))?;
            user.github_username = Some(github_username.to_string());
            user.github_access_token = Some(access_token.to_string());
            user.updated_at = Utc::now();
            write_row(&mut users, &user_key, &user)?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }
}

fn load_identity(
    users: &impl ReadableTable<&'static str, &'static [u8]>,
    wallets: &impl ReadableTable<&'static str, &'static [u8]>,
    user_wallets: &impl ReadableTable<&'static str, &'static str>,
    user_id: Uuid,
) -> StoreResult<Option<UserIdentity>> {
    let user_key = user_id.to_string();
    let Some(user) = read_row::<UserRecord>(users, &user_key)? else {
        return Ok(None);
    };

    let mut owned = Vec::new();
    for wallet_id in scan_children(user_wallets, &user_key)? {
        if let Some(wallet) = read_row::<WalletRecord>(wallets, &wallet_id)? {
            owned.push(wallet);
        }
    }
    owned.sort_by(|a, b| {
        b.is_primary
            .cmp(&a.is_primary)
            .then(a.created_at.cmp(&b.created_at))
    });

    Ok(Some(UserIdentity {
        user,
        wallets: owned,
    }))
}

/// Move a unique index entry from `previous` to `next` for `user_key`.
fn claim_unique(
    index: &mut Table<'_, &'static str, &'static str>,
    field: &'static str,
    previous: Option<&str>,
    next: &str,
    user_key: &str,
) -> StoreResult<()> {
    let next_key = next.to_lowercase();
    if let Some(holder) = read_index(&*index, &next_key)? {
        if holder != user_key {
            return Err(StoreError::Conflict { field });
        }
    }
    if let Some(previous) = previous {
        index.remove(previous.to_lowercase().as_str())?;
    }
    index.insert(next_key.as_str(), user_key)?;
    Ok(())
}

fn validate_email(raw: &str) -> StoreResult<String> {
    let email = raw.trim();
    let invalid = || StoreError::Constraint {
        column: "email",
        value: raw.to_string(),
    };
    if email.is_empty() || email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(email.to_string())
}

fn validate_username(raw: &str) -> StoreResult<String> {
    let username = raw.trim();
    let len = username.chars().count();
    let allowed = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) || !allowed {
        return Err(StoreError::Constraint {
            column: "username",
            value: raw.to_string(),
        });
    }
    Ok(username.to_string())
}

fn validate_avatar_url(raw: &str) -> StoreResult<String> {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(StoreError::Constraint {
            column: "avatar_url",
            value: raw.to_string(),
        }),
    }
}
