// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.
//!
//! Each repository borrows the shared [`Database`](super::Database) and
//! offers the operations for one entity family.

pub mod nonces;
pub mod projects;
pub mod users;

pub use nonces::{NonceRecord, NonceRepository};
pub use projects::{NewProject, ProjectRecord, ProjectRepository, ProjectType, ProjectUpdate};
pub use users::{ProfileUpdate, UserIdentity, UserRecord, UserRepository, WalletRecord};
