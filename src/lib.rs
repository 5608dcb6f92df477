// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! dApp0 Builder Server - wallet-authenticated backend for generating
//! multi-chain dApp projects.
//!
//! Users sign in with a Solana, EVM, Sui or XRP wallet, describe a frontend
//! or on-chain agent, receive generated code (from an upstream service or a
//! per-chain template), save it as a project and push it to GitHub.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Nonce challenges, wallet signatures and session tokens
//! - `chains` - Registry of supported chains
//! - `generation` - Upstream code generation with template fallback
//! - `github` - GitHub REST client and project export
//! - `storage` - Embedded redb database and repositories

pub mod api;
pub mod auth;
pub mod chains;
pub mod config;
pub mod error;
pub mod generation;
pub mod github;
pub mod nonce_sweeper;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
