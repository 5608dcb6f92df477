// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature verification.
//!
//! Each chain's [`SignatureScheme`] decides how the address and signature are
//! encoded and what exactly the wallet signed:
//!
//! | Scheme                | Address            | Signature                          |
//! |-----------------------|--------------------|------------------------------------|
//! | `Ed25519Base58`       | base58 public key  | base58, 64 bytes                   |
//! | `Eip191`              | 0x-hex, 20 bytes   | hex `r‖s‖v`, 65 bytes              |
//! | `SuiPersonalMessage`  | 0x-hex, 32 bytes   | base64 `flag‖sig‖pubkey`, 97 bytes |
//! | `Xrpl`                | classic `r…`       | hex; key sent alongside            |

use alloy::primitives::{Address, Signature as EcdsaSignature};
use base64ct::{Base64, Encoding};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use k256::ecdsa::{
    signature::hazmat::PrehashVerifier, Signature as Secp256k1Signature,
    VerifyingKey as Secp256k1Key,
};
use ripemd::Ripemd160;
use sha2::{Sha256, Sha512};

use crate::chains::{ChainType, SignatureScheme};

type Blake2b256 = Blake2b<U32>;

/// Sui signature flag for Ed25519 keys.
const SUI_ED25519_FLAG: u8 = 0x00;
/// Intent prefix for `signPersonalMessage`: scope PersonalMessage, version
/// V0, app Sui.
const SUI_PERSONAL_MESSAGE_INTENT: [u8; 3] = [3, 0, 0];
/// Leading byte marking an XRPL Ed25519 public key.
const XRPL_ED25519_PREFIX: u8 = 0xED;
/// Version byte of an XRPL classic account address.
const XRPL_ACCOUNT_VERSION: u8 = 0x00;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("invalid signature encoding: {0}")]
    Encoding(String),

    #[error("unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    #[error("signature does not match address")]
    Mismatch,
}

/// True when `signature` is `address`'s signature over `message` under the
/// chain's scheme. Every failure, including undecodable input, is `false`.
///
/// `public_key` is only consulted for XRP, whose addresses are key hashes.
pub fn verify_signature(
    chain: ChainType,
    address: &str,
    signature: &str,
    message: &str,
    public_key: Option<&str>,
) -> bool {
    match check_signature(chain, address, signature, message, public_key) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(chain = %chain, error = %e, "Wallet signature rejected");
            false
        }
    }
}

/// Like [`verify_signature`], with the reason for rejection.
pub fn check_signature(
    chain: ChainType,
    address: &str,
    signature: &str,
    message: &str,
    public_key: Option<&str>,
) -> Result<(), SignatureError> {
    let address = address.trim();
    let signature = signature.trim();
    match chain.signature_scheme() {
        SignatureScheme::Ed25519Base58 => verify_ed25519_base58(address, signature, message),
        SignatureScheme::Eip191 => verify_eip191(address, signature, message),
        SignatureScheme::SuiPersonalMessage => verify_sui_personal_message(address, signature, message),
        SignatureScheme::Xrpl => {
            let public_key = public_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or_else(|| SignatureError::Encoding("public key required".into()))?;
            verify_xrpl(address, public_key, signature, message)
        }
    }
}

fn verify_ed25519_base58(address: &str, signature: &str, message: &str) -> Result<(), SignatureError> {
    let key_bytes: [u8; 32] = bs58::decode(address)
        .into_vec()
        .map_err(|e| SignatureError::Address(e.to_string()))?
        .try_into()
        .map_err(|_| SignatureError::Address("expected a 32-byte public key".into()))?;
    let sig_bytes: [u8; 64] = bs58::decode(signature)
        .into_vec()
        .map_err(|e| SignatureError::Encoding(e.to_string()))?
        .try_into()
        .map_err(|_| SignatureError::Encoding("expected a 64-byte signature".into()))?;

    ed25519_verify(&key_bytes, &sig_bytes, message.as_bytes())
}

fn verify_eip191(address: &str, signature: &str, message: &str) -> Result<(), SignatureError> {
    let expected: Address = address
        .parse()
        .map_err(|e| SignatureError::Address(format!("{e}")))?;
    let raw = alloy::primitives::hex::decode(signature).map_err(|e| SignatureError::Encoding(e.to_string()))?;
    let sig = EcdsaSignature::from_raw(&raw).map_err(|e| SignatureError::Encoding(e.to_string()))?;

    let recovered = sig
        .recover_address_from_msg(message.as_bytes())
        .map_err(|_| SignatureError::Mismatch)?;
    if recovered == expected {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

fn verify_sui_personal_message(address: &str, signature: &str, message: &str) -> Result<(), SignatureError> {
    let raw = Base64::decode_vec(signature).map_err(|e| SignatureError::Encoding(e.to_string()))?;
    if raw.len() != 1 + 64 + 32 {
        return Err(SignatureError::Encoding(format!(
            "expected 97 bytes, got {}",
            raw.len()
        )));
    }
    if raw[0] != SUI_ED25519_FLAG {
        return Err(SignatureError::UnsupportedScheme(format!(
            "sui signature flag {:#04x}",
            raw[0]
        )));
    }

    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(&raw[1..65]);
    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&raw[65..97]);

    if sui_address(&key_bytes) != address.to_ascii_lowercase() {
        return Err(SignatureError::Mismatch);
    }

    let digest = sui_personal_message_digest(message.as_bytes());
    ed25519_verify(&key_bytes, &sig_bytes, &digest)
}

/// XRPL keypair signature. Ed25519 keys sign the raw message, secp256k1 keys
/// sign its SHA-512Half with a DER (or 64-byte compact) signature.
fn verify_xrpl(address: &str, public_key: &str, signature: &str, message: &str) -> Result<(), SignatureError> {
    let key = alloy::primitives::hex::decode(public_key).map_err(|e| SignatureError::Address(e.to_string()))?;
    if key.len() != 33 {
        return Err(SignatureError::Address(format!(
            "expected a 33-byte public key, got {}",
            key.len()
        )));
    }
    if xrpl_address(&key) != address {
        return Err(SignatureError::Mismatch);
    }
    let raw = alloy::primitives::hex::decode(signature).map_err(|e| SignatureError::Encoding(e.to_string()))?;

    if key[0] == XRPL_ED25519_PREFIX {
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&key[1..]);
        let sig_bytes: [u8; 64] = raw
            .try_into()
            .map_err(|_| SignatureError::Encoding("expected a 64-byte signature".into()))?;
        return ed25519_verify(&key_bytes, &sig_bytes, message.as_bytes());
    }

    let verifying_key = Secp256k1Key::from_sec1_bytes(&key).map_err(|e| SignatureError::Address(e.to_string()))?;
    let sig = Secp256k1Signature::from_der(&raw)
        .or_else(|_| Secp256k1Signature::from_slice(&raw))
        .map_err(|e| SignatureError::Encoding(e.to_string()))?;
    let sig = sig.normalize_s().unwrap_or(sig);
    verifying_key
        .verify_prehash(&sha512_half(message.as_bytes()), &sig)
        .map_err(|_| SignatureError::Mismatch)
}

/// Classic XRPL address of a 33-byte public key:
/// base58check(RIPEMD-160(SHA-256(key))) in the Ripple alphabet.
pub fn xrpl_address(public_key: &[u8]) -> String {
    let account_id = Ripemd160::digest(Sha256::digest(public_key));
    bs58::encode(account_id)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check_version(XRPL_ACCOUNT_VERSION)
        .into_string()
}

fn sha512_half(payload: &[u8]) -> [u8; 32] {
    let mut half = [0u8; 32];
    half.copy_from_slice(&Sha512::digest(payload)[..32]);
    half
}

fn ed25519_verify(key: &[u8; 32], signature: &[u8; 64], payload: &[u8]) -> Result<(), SignatureError> {
    let key = VerifyingKey::from_bytes(key).map_err(|e| SignatureError::Address(e.to_string()))?;
    let sig = Ed25519Signature::from_bytes(signature);
    key.verify(payload, &sig).map_err(|_| SignatureError::Mismatch)
}

/// Sui address of an Ed25519 public key: `0x` + hex(BLAKE2b-256(flag ‖ key)).
pub fn sui_address(public_key: &[u8; 32]) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update([SUI_ED25519_FLAG]);
    hasher.update(public_key);
    format!("0x{}", alloy::primitives::hex::encode(hasher.finalize()))
}

/// Digest a Sui wallet signs for `signPersonalMessage(message)`.
///
/// The message is BCS-encoded as a byte vector and prefixed with the
/// personal-message intent before hashing.
pub fn sui_personal_message_digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(SUI_PERSONAL_MESSAGE_INTENT);
    hasher.update(uleb128(message.len()));
    hasher.update(message);
    hasher.finalize().into()
}

fn uleb128(mut value: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}
