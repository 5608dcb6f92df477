// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    chains::{ChainConfig, ChainType, GenerationContext, SignatureScheme},
    generation::UiKind,
    github::{Repo, RepoOwner},
    state::AppState,
    storage::{ProjectRecord, ProjectType, TableCounts, WalletRecord},
};

pub mod auth;
pub mod chains;
pub mod extract;
pub mod generate;
pub mod github;
pub mod health;
pub mod projects;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/nonce", post(auth::issue_nonce))
        .route("/auth/verify", post(auth::verify_wallet))
        .route("/auth/me", get(auth::current_user))
        .route("/auth/profile", put(auth::update_profile))
        .route("/chains", get(chains::list_chains))
        .route("/chains/{chain}", get(chains::get_chain))
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/public", get(projects::list_public_projects))
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/generate", post(generate::generate))
        .route("/generate-ui", post(generate::generate_ui_component))
        .route("/github/connect", put(github::connect_github))
        .route("/github/repos", get(github::list_repos))
        .route("/github/export", post(github::export));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Registers the `bearer` scheme referenced by authenticated paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::issue_nonce,
        auth::verify_wallet,
        auth::current_user,
        auth::update_profile,
        chains::list_chains,
        chains::get_chain,
        projects::list_projects,
        projects::list_public_projects,
        projects::create_project,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        generate::generate,
        generate::generate_ui_component,
        github::connect_github,
        github::list_repos,
        github::export,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ChainType,
            ChainConfig,
            GenerationContext,
            SignatureScheme,
            ProjectType,
            ProjectRecord,
            WalletRecord,
            UiKind,
            Repo,
            RepoOwner,
            TableCounts,
            auth::NonceRequest,
            auth::NonceResponse,
            auth::VerifyRequest,
            auth::VerifyResponse,
            auth::UserResponse,
            auth::UserEnvelope,
            auth::ProfileRequest,
            projects::CreateProjectRequest,
            projects::UpdateProjectRequest,
            projects::ProjectResponse,
            projects::ProjectListResponse,
            projects::MessageResponse,
            generate::GenerateRequest,
            generate::GenerateResponse,
            generate::GenerateUiRequest,
            generate::GenerateUiResponse,
            github::ConnectGitHubRequest,
            github::ConnectGitHubResponse,
            github::ReposResponse,
            github::ExportRequest,
            github::ExportResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Wallet sign-in and profile"),
        (name = "Chains", description = "Supported chain registry"),
        (name = "Projects", description = "Saved dApp projects"),
        (name = "Generation", description = "AI code generation"),
        (name = "GitHub", description = "Repository connection and export"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use alloy::primitives::B256;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Signs in with a fixed EVM key and returns the session token.
    async fn sign_in(app: &Router) -> String {
        let signer = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x42)).unwrap();
        let address = signer.address().to_string();

        let response = send(
            app,
            post_json("/api/auth/nonce", json!({ "walletAddress": address }), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let challenge = json_body(response).await;
        let message = challenge["message"].as_str().unwrap().to_string();

        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        let response = send(
            app,
            post_json(
                "/api/auth/verify",
                json!({
                    "walletAddress": address,
                    "signature": alloy::primitives::hex::encode_prefixed(signature.as_bytes()),
                    "chain": "ethereum",
                    "message": message,
                }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["needsProfileSetup"], true);
        body["sessionToken"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn sign_in_then_manage_projects() {
        let (state, _dir) = test_state();
        let app = router(state);
        let token = sign_in(&app).await;

        let response = send(&app, get_with("/api/auth/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let me = json_body(response).await;
        assert_eq!(me["user"]["wallets"][0]["chain_type"], "ethereum");

        let response = send(
            &app,
            post_json(
                "/api/projects",
                json!({ "name": "Swap UI", "type": "frontend", "chain": "solana", "isPublic": true }),
                Some(&token),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["project"]["id"].as_str().unwrap().to_string();

        let response = send(&app, get_with("/api/projects", Some(&token))).await;
        let listed = json_body(response).await;
        assert_eq!(listed["projects"].as_array().unwrap().len(), 1);
        assert_eq!(listed["projects"][0]["id"], id.as_str());

        let response = send(&app, get_with("/api/projects/public", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["projects"][0]["name"], "Swap UI");

        let response = send(
            &app,
            Request::delete(format!("/api/projects/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, get_with(&format!("/api/projects/{id}"), Some(&token))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn replayed_signature_is_rejected() {
        let (state, _dir) = test_state();
        let app = router(state);
        let signer = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x07)).unwrap();
        let address = signer.address().to_string();

        let challenge = json_body(
            send(&app, post_json("/api/auth/nonce", json!({ "walletAddress": address }), None)).await,
        )
        .await;
        let message = challenge["message"].as_str().unwrap().to_string();
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        let body = json!({
            "walletAddress": address,
            "signature": alloy::primitives::hex::encode_prefixed(signature.as_bytes()),
            "chain": "polygon",
            "message": message,
        });

        let first = send(&app, post_json("/api/auth/verify", body.clone(), None)).await;
        assert_eq!(first.status(), StatusCode::OK);
        let replay = send(&app, post_json("/api/auth/verify", body, None)).await;
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(replay).await["success"], false);
    }

    #[tokio::test]
    async fn protected_routes_require_session() {
        let (state, _dir) = test_state();
        let app = router(state);

        for uri in ["/api/projects", "/api/auth/me", "/api/github/repos"] {
            let response = send(&app, get_with(uri, None)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
        let response = send(&app, get_with("/api/projects", Some("not-a-token"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let (state, _dir) = test_state();
        let app = router(state);

        let response = send(
            &app,
            Request::post("/api/auth/nonce")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);

        let response = send(
            &app,
            post_json(
                "/api/generate",
                json!({ "prompt": "x", "type": "agent", "chain": "dogecoin" }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generate_falls_back_without_upstream() {
        let (state, _dir) = test_state();
        let app = router(state);
        let response = send(
            &app,
            post_json(
                "/api/generate",
                json!({ "prompt": "token gate", "type": "frontend", "chain": "sui" }),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["chain"], "sui");
        assert!(body["warning"].is_string());
        assert!(body["code"].as_str().unwrap().contains("token gate"));
    }

    #[tokio::test]
    async fn chains_and_health_are_public() {
        let (state, _dir) = test_state();
        let app = router(state);

        let response = send(&app, get_with("/api/chains", None)).await;
        assert_eq!(json_body(response).await["chains"].as_array().unwrap().len(), 6);

        let response = send(&app, get_with("/api/chains/xrp", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, get_with("/api/chains/dogecoin", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, get_with("/health/ready", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (state, _dir) = test_state();
        let app = router(state);
        let response = send(&app, get_with("/api/nope", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (state, _dir) = test_state();
        let app = router(state);
        let response = send(&app, get_with("/api-doc/openapi.json", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"]["/api/auth/verify"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
    }
}
