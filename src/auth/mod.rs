// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet-based sign-in for the dApp builder API.
//!
//! ## Auth Flow
//!
//! 1. Client requests a nonce for its wallet address (`/api/auth/nonce`)
//! 2. Wallet signs the returned login message
//! 3. Client posts address, chain, message and signature (`/api/auth/verify`)
//! 4. Server:
//!    - Consumes the nonce (single use, TTL-bound)
//!    - Verifies the signature with the chain's scheme
//!    - Resolves or creates the user owning the wallet
//!    - Returns a signed session token
//! 5. Client sends `Authorization: Bearer <session token>` afterwards
//!
//! ## Security
//!
//! - Unverifiable signatures are rejected, never assumed valid
//! - Session tokens are HS256 JWTs with expiry and issuer checks
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod nonce;
pub mod session;
pub mod signature;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use nonce::{login_message, NonceError, NonceIssuer};
pub use session::{SessionIssuer, SessionToken};
pub use signature::verify_signature;
