// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a single redb file (`DATABASE_PATH`):
//! users, wallets, projects and outstanding sign-in nonces, plus the index
//! tables that enforce uniqueness and back per-user listings.
//!
//! ```text
//! Database
//!   ├── UserRepository     users, wallets, identity resolution, profile
//!   ├── ProjectRepository  projects scoped by owner
//!   └── NonceRepository    sign-in challenges
//! ```

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{Database, StoreError, StoreResult, TableCounts};
pub use ownership::{OwnedResource, OwnershipCheck};
pub use repository::{
    NewProject, NonceRecord, NonceRepository, ProfileUpdate, ProjectRecord, ProjectRepository,
    ProjectType, ProjectUpdate, UserIdentity, UserRecord, UserRepository, WalletRecord,
};
