// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for user-scoped rows.
//!
//! A row that belongs to somebody else is reported exactly like a row that
//! does not exist, so callers cannot probe for foreign ids.

use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Trait for rows that have an owner.
pub trait OwnedResource {
    /// Resource name used in not-found errors.
    const RESOURCE: &'static str;

    fn owner_user_id(&self) -> Uuid;
}

/// Narrow a lookup result to rows owned by `user_id`.
pub trait OwnershipCheck<T> {
    fn owned_by(self, user_id: Uuid) -> StoreResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn owned_by(self, user_id: Uuid) -> StoreResult<T> {
        match self {
            Some(resource) if resource.owner_user_id() == user_id => Ok(resource),
            _ => Err(StoreError::NotFound(T::RESOURCE.to_string())),
        }
    }
}

impl<T: OwnedResource> OwnershipCheck<T> for StoreResult<Option<T>> {
    fn owned_by(self, user_id: Uuid) -> StoreResult<T> {
        self?.owned_by(user_id)
    }
}
