// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet sign-in and profile endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::extract::ApiJson;
use crate::{
    auth::{verify_signature, Auth, NonceError},
    chains::{canonical_evm_address, ChainType},
    error::ApiError,
    state::AppState,
    storage::{ProfileUpdate, UserIdentity, UserRepository, WalletRecord},
};

/// Key under which a wallet's nonce is stored.
///
/// The nonce request carries no chain. Anything that parses as a 20-byte
/// hex address takes its canonical EVM form. Other `0x` addresses are
/// lower-cased. Base58 and XRPL addresses are kept verbatim.
fn nonce_key(address: &str) -> String {
    let trimmed = address.trim();
    if let Some(canonical) = canonical_evm_address(trimmed) {
        canonical
    } else if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        trimmed.to_ascii_lowercase()
    } else {
        trimmed.to_string()
    }
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{what} is required")));
    }
    Ok(trimmed)
}

/// User as returned to clients. The GitHub token never leaves the server.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub github_username: Option<String>,
    pub github_connected: bool,
    pub wallets: Vec<WalletRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserIdentity> for UserResponse {
    fn from(identity: UserIdentity) -> Self {
        let UserIdentity { user, wallets } = identity;
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            avatar_url: user.avatar_url,
            github_username: user.github_username,
            github_connected: user.github_access_token.is_some(),
            wallets,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequest {
    pub wallet_address: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    pub success: bool,
    pub nonce: String,
    /// Exact text the wallet must sign.
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/api/auth/nonce",
    tag = "Auth",
    request_body = NonceRequest,
    responses(
        (status = 200, description = "Challenge issued", body = NonceResponse),
        (status = 400, description = "Missing wallet address"),
    )
)]
pub async fn issue_nonce(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NonceRequest>,
) -> Result<Json<NonceResponse>, ApiError> {
    let address = required(&request.wallet_address, "Wallet address")?;
    let record = state
        .nonces
        .issue(&state.db, &nonce_key(address))
        .map_err(|e| ApiError::internal("Failed to generate nonce", e))?;

    Ok(Json(NonceResponse {
        success: true,
        nonce: record.nonce,
        message: record.message,
        expires_at: record.expires_at,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub wallet_address: String,
    pub signature: String,
    pub chain: ChainType,
    pub message: String,
    /// Hex public key of the signing wallet. Required for XRP, where the
    /// address cannot be recovered from the signature.
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub user: UserResponse,
    pub needs_profile_setup: bool,
    /// Bearer token for authenticated endpoints.
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    /// Session lifetime in seconds.
    pub expires_in: u64,
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "Auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Signed in", body = VerifyResponse),
        (status = 400, description = "Missing field, unknown chain, no live nonce or invalid signature"),
    )
)]
pub async fn verify_wallet(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let address = required(&request.wallet_address, "Wallet address")?;
    let signature = required(&request.signature, "Signature")?;
    if request.message.is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }

    state
        .nonces
        .redeem(&state.db, &nonce_key(address), &request.message)
        .map_err(|e| match e {
            NonceError::Store(e) => ApiError::internal("Failed to verify signature", e),
            other => ApiError::bad_request(other.to_string()),
        })?;

    let public_key = request.public_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
    if !verify_signature(request.chain, address, signature, &request.message, public_key) {
        warn!(chain = %request.chain, "Rejected wallet sign-in with invalid signature");
        return Err(ApiError::bad_request("Invalid signature"));
    }

    let (identity, created) = UserRepository::new(&state.db)
        .resolve_wallet_identity(address, request.chain)
        .map_err(|e| ApiError::from_store(e, "User not found", "Failed to verify signature"))?;

    let session = state
        .sessions
        .issue(identity.user.id)
        .map_err(|e| ApiError::internal("Failed to create session", e))?;

    info!(user_id = %identity.user.id, chain = %request.chain, created, "Wallet signed in");

    Ok(Json(VerifyResponse {
        success: true,
        needs_profile_setup: identity.user.needs_profile_setup(),
        user: identity.into(),
        session_token: session.token,
        expires_at: session.expires_at,
        expires_in: state.sessions.ttl().as_secs(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEnvelope {
    pub success: bool,
    pub user: UserResponse,
    pub needs_profile_setup: bool,
}

impl From<UserIdentity> for UserEnvelope {
    fn from(identity: UserIdentity) -> Self {
        Self {
            success: true,
            needs_profile_setup: identity.user.needs_profile_setup(),
            user: identity.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<UserEnvelope>, ApiError> {
    let identity = UserRepository::new(&state.db)
        .get_identity(user.user_id)
        .map_err(|e| ApiError::internal("Failed to fetch user", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(identity.into()))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "Auth",
    security(("bearer" = [])),
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserEnvelope),
        (status = 400, description = "Empty or malformed update"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Email or username already taken"),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<ProfileRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let update = ProfileUpdate {
        email: request.email,
        username: request.username,
        avatar_url: request.avatar_url,
    };

    let users = UserRepository::new(&state.db);
    users
        .update_profile(user.user_id, &update)
        .map_err(|e| ApiError::from_store(e, "User not found", "Failed to update profile"))?;

    let identity = users
        .get_identity(user.user_id)
        .map_err(|e| ApiError::internal("Failed to fetch user", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %user.user_id, "Profile updated");
    Ok(Json(identity.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::test_support::test_state;
    use axum::http::StatusCode;
    use ed25519_dalek::{Signer, SigningKey};

    fn solana_wallet(seed: u8) -> (SigningKey, String) {
        let key = SigningKey::from_bytes(&[seed; 32]);
        let address = bs58::encode(key.verifying_key().as_bytes()).into_string();
        (key, address)
    }

    async fn sign_in(state: &AppState, key: &SigningKey, address: &str) -> Result<VerifyResponse, ApiError> {
        let Json(nonce) = issue_nonce(
            State(state.clone()),
            ApiJson(NonceRequest {
                wallet_address: address.to_string(),
            }),
        )
        .await?;

        let signature = bs58::encode(key.sign(nonce.message.as_bytes()).to_bytes()).into_string();
        let Json(response) = verify_wallet(
            State(state.clone()),
            ApiJson(VerifyRequest {
                wallet_address: address.to_string(),
                signature,
                chain: ChainType::Solana,
                message: nonce.message,
                public_key: None,
            }),
        )
        .await?;
        Ok(response)
    }

    fn auth_for(user_id: Uuid) -> Auth {
        Auth(AuthenticatedUser {
            user_id,
            session_id: "test".to_string(),
            expires_at: i64::MAX,
        })
    }

    #[test]
    fn nonce_key_canonicalizes_hex_addresses_only() {
        assert_eq!(nonce_key(" 0xAbC "), "0xabc");
        assert_eq!(nonce_key("0XAB"), "0xab");
        assert_eq!(nonce_key("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"), "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU");
        assert_eq!(
            nonce_key("52908400098527886E0F7030069857D2E4169EE7"),
            "0x52908400098527886e0f7030069857d2e4169ee7"
        );
        assert_eq!(
            nonce_key("0x52908400098527886E0F7030069857D2E4169EE7"),
            "0x52908400098527886e0f7030069857d2e4169ee7"
        );
    }

    #[tokio::test]
    async fn first_sign_in_creates_user_and_second_reuses_it() {
        let (state, _dir) = test_state();
        let (key, address) = solana_wallet(7);

        let first = sign_in(&state, &key, &address).await.unwrap();
        assert!(first.success);
        assert!(first.needs_profile_setup);
        assert_eq!(first.user.wallets.len(), 1);
        assert_eq!(first.user.wallets[0].wallet_address, address);
        assert!(first.user.wallets[0].is_primary);

        assert_eq!(first.expires_in, state.sessions.ttl().as_secs());
        assert!(first.expires_in > 0);
        let verified = state.sessions.verify(&first.session_token).unwrap();
        assert_eq!(verified.user_id, first.user.id);

        let second = sign_in(&state, &key, &address).await.unwrap();
        assert_eq!(second.user.id, first.user.id);

        let counts = state.db.counts().unwrap();
        assert_eq!(counts.users, 1);
        assert_eq!(counts.wallets, 1);
    }

    #[tokio::test]
    async fn verify_without_nonce_is_rejected() {
        let (state, _dir) = test_state();
        let (key, address) = solana_wallet(8);
        let message = crate::auth::login_message("made-up");
        let signature = bs58::encode(key.sign(message.as_bytes()).to_bytes()).into_string();

        let err = verify_wallet(
            State(state.clone()),
            ApiJson(VerifyRequest {
                wallet_address: address,
                signature,
                chain: ChainType::Solana,
                message,
                public_key: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No active nonce for this wallet address");
        assert_eq!(state.db.counts().unwrap().users, 0);
    }

    #[tokio::test]
    async fn bad_signature_consumes_nonce_and_creates_nothing() {
        let (state, _dir) = test_state();
        let (_, address) = solana_wallet(9);
        let (other_key, _) = solana_wallet(10);

        let err = sign_in(&state, &other_key, &address).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid signature");

        let counts = state.db.counts().unwrap();
        assert_eq!(counts.users, 0);
        assert_eq!(counts.nonces, 0);
    }

    fn xrp_wallet(seed: u8) -> (SigningKey, String, String) {
        let key = SigningKey::from_bytes(&[seed; 32]);
        let mut public = vec![0xED];
        public.extend_from_slice(key.verifying_key().as_bytes());
        let address = crate::auth::signature::xrpl_address(&public);
        (key, address, alloy::primitives::hex::encode_upper(&public))
    }

    async fn xrp_verify(
        state: &AppState,
        key: &SigningKey,
        address: &str,
        public_key: Option<String>,
    ) -> Result<VerifyResponse, ApiError> {
        let Json(nonce) = issue_nonce(
            State(state.clone()),
            ApiJson(NonceRequest {
                wallet_address: address.to_string(),
            }),
        )
        .await?;
        let signature = alloy::primitives::hex::encode_upper(key.sign(nonce.message.as_bytes()).to_bytes());
        let Json(response) = verify_wallet(
            State(state.clone()),
            ApiJson(VerifyRequest {
                wallet_address: address.to_string(),
                signature,
                chain: ChainType::Xrp,
                message: nonce.message,
                public_key,
            }),
        )
        .await?;
        Ok(response)
    }

    #[tokio::test]
    async fn xrp_sign_in_with_public_key() {
        let (state, _dir) = test_state();
        let (key, address, public_key) = xrp_wallet(21);

        let response = xrp_verify(&state, &key, &address, Some(public_key)).await.unwrap();
        assert_eq!(response.user.wallets[0].chain_type, ChainType::Xrp);
        assert_eq!(response.user.wallets[0].wallet_address, address);
    }

    #[tokio::test]
    async fn xrp_sign_in_rejects_missing_or_foreign_key() {
        let (state, _dir) = test_state();
        let (key, address, _) = xrp_wallet(22);
        let (_, _, other_public_key) = xrp_wallet(23);

        let err = xrp_verify(&state, &key, &address, None).await.unwrap_err();
        assert_eq!(err.message, "Invalid signature");

        let err = xrp_verify(&state, &key, &address, Some(other_public_key)).await.unwrap_err();
        assert_eq!(err.message, "Invalid signature");
        assert_eq!(state.db.counts().unwrap().users, 0);
    }

    #[tokio::test]
    async fn prefixed_and_bare_evm_address_resolve_to_one_user() {
        use alloy::primitives::B256;
        use alloy::signers::{local::PrivateKeySigner, SignerSync};

        let (state, _dir) = test_state();
        let signer = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x24)).unwrap();
        let prefixed = format!("{:#x}", signer.address());
        let bare = prefixed.trim_start_matches("0x").to_string();

        let mut users = Vec::new();
        for address in [&prefixed, &bare] {
            let Json(nonce) = issue_nonce(
                State(state.clone()),
                ApiJson(NonceRequest {
                    wallet_address: address.clone(),
                }),
            )
            .await
            .unwrap();
            let signature = signer.sign_message_sync(nonce.message.as_bytes()).unwrap();
            let Json(response) = verify_wallet(
                State(state.clone()),
                ApiJson(VerifyRequest {
                    wallet_address: address.clone(),
                    signature: alloy::primitives::hex::encode_prefixed(signature.as_bytes()),
                    chain: ChainType::Ethereum,
                    message: nonce.message,
                    public_key: None,
                }),
            )
            .await
            .unwrap();
            assert_eq!(response.user.wallets[0].wallet_address, prefixed);
            users.push(response.user.id);
        }

        assert_eq!(users[0], users[1]);
        let counts = state.db.counts().unwrap();
        assert_eq!(counts.users, 1);
        assert_eq!(counts.wallets, 1);
    }

    #[tokio::test]
    async fn empty_wallet_address_is_rejected() {
        let (state, _dir) = test_state();
        let err = issue_nonce(
            State(state),
            ApiJson(NonceRequest {
                wallet_address: "   ".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn profile_completion_flow() {
        let (state, _dir) = test_state();
        let (key, address) = solana_wallet(11);
        let signed_in = sign_in(&state, &key, &address).await.unwrap();
        let user_id = signed_in.user.id;

        let err = update_profile(
            State(state.clone()),
            auth_for(user_id),
            ApiJson(ProfileRequest {
                email: None,
                username: None,
                avatar_url: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let Json(updated) = update_profile(
            State(state.clone()),
            auth_for(user_id),
            ApiJson(ProfileRequest {
                email: Some("dev@example.com".to_string()),
                username: Some("builder".to_string()),
                avatar_url: None,
            }),
        )
        .await
        .unwrap();
        assert!(!updated.needs_profile_setup);
        assert_eq!(updated.user.username.as_deref(), Some("builder"));

        let Json(me) = current_user(State(state.clone()), auth_for(user_id)).await.unwrap();
        assert_eq!(me.user.email.as_deref(), Some("dev@example.com"));
        assert_eq!(me.user.wallets.len(), 1);
    }

    #[tokio::test]
    async fn taken_username_conflicts() {
        let (state, _dir) = test_state();
        let (key_a, address_a) = solana_wallet(12);
        let (key_b, address_b) = solana_wallet(13);
        let a = sign_in(&state, &key_a, &address_a).await.unwrap().user.id;
        let b = sign_in(&state, &key_b, &address_b).await.unwrap().user.id;

        update_profile(
            State(state.clone()),
            auth_for(a),
            ApiJson(ProfileRequest {
                email: None,
                username: Some("Satoshi".to_string()),
                avatar_url: None,
            }),
        )
        .await
        .unwrap();

        let err = update_profile(
            State(state.clone()),
            auth_for(b),
            ApiJson(ProfileRequest {
                email: None,
                username: Some("satoshi".to_string()),
                avatar_url: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn me_for_unknown_user_is_not_found() {
        let (state, _dir) = test_state();
        let err = current_user(State(state), auth_for(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
