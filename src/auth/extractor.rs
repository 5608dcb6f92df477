// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user.user_id is the signed-in user
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Legacy header carrying a raw user id. Honoured only in `dev` builds.
#[cfg(feature = "dev")]
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Extractor for authenticated users.
///
/// Reads `Authorization: Bearer <session token>` and verifies it with the
/// server's [`SessionIssuer`](super::SessionIssuer).
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            #[cfg(feature = "dev")]
            if let Some(user) = dev_user(parts) {
                return Ok(Auth(user));
            }
            return Err(AuthError::MissingAuthHeader);
        };

        let token = header
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        let user = state.sessions.verify(token)?;
        Ok(Auth(user))
    }
}

/// Development fallback: trust a raw `x-user-id` header.
///
/// WARNING: This must never be reachable in production builds.
#[cfg(feature = "dev")]
fn dev_user(parts: &Parts) -> Option<AuthenticatedUser> {
    let raw = parts.headers.get(DEV_USER_HEADER)?.to_str().ok()?;
    let user_id = uuid::Uuid::parse_str(raw.trim()).ok()?;
    tracing::warn!(user_id = %user_id, "Accepting unauthenticated x-user-id header (dev build)");
    Some(AuthenticatedUser {
        user_id,
        session_id: "dev".to_string(),
        expires_at: i64::MAX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::http::Request;
    use uuid::Uuid;

    async fn extract(request: Request<()>, state: &AppState) -> Result<Auth, AuthError> {
        let (mut parts, _) = request.into_parts();
        Auth::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (state, _dir) = test_state();
        let request = Request::builder().uri("/").body(()).unwrap();
        assert!(matches!(
            extract(request, &state).await,
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let (state, _dir) = test_state();
        let request = Request::builder()
            .uri("/")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request, &state).await,
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[tokio::test]
    async fn valid_session_yields_user() {
        let (state, _dir) = test_state();
        let user_id = Uuid::new_v4();
        let session = state.sessions.issue(user_id).unwrap();

        let request = Request::builder()
            .uri("/")
            .header(AUTHORIZATION, format!("Bearer {}", session.token))
            .body(())
            .unwrap();
        let Auth(user) = extract(request, &state).await.unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (state, _dir) = test_state();
        let request = Request::builder()
            .uri("/")
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap();
        assert!(extract(request, &state).await.is_err());
    }

    #[cfg(not(feature = "dev"))]
    #[tokio::test]
    async fn raw_user_id_header_is_ignored_outside_dev() {
        let (state, _dir) = test_state();
        let request = Request::builder()
            .uri("/")
            .header("x-user-id", Uuid::new_v4().to_string())
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request, &state).await,
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[cfg(feature = "dev")]
    #[tokio::test]
    async fn raw_user_id_header_is_accepted_in_dev() {
        let (state, _dir) = test_state();
        let user_id = Uuid::new_v4();
        let request = Request::builder()
            .uri("/")
            .header(DEV_USER_HEADER, user_id.to_string())
            .body(())
            .unwrap();
        let Auth(user) = extract(request, &state).await.unwrap();
        assert_eq!(user.user_id, user_id);
    }
}
