// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the hosted code generator.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CodeGenerator, GenerationError, UpstreamRequest};
use crate::error::truncate_upstream_body;
use crate::config::GenerationConfig;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    code: Option<String>,
}

/// Calls `POST {base}/api/generate` with a bearer key.
#[derive(Clone)]
pub struct HttpCodeGenerator {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl std::fmt::Debug for HttpCodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCodeGenerator")
            .field("endpoint", &self.endpoint)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

impl HttpCodeGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            endpoint: format!(
                "{}{GENERATE_PATH}",
                config.base_url.as_str().trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl CodeGenerator for HttpCodeGenerator {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &UpstreamRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = truncate_upstream_body(response.text().await.unwrap_or_default());
            return Err(GenerationError::Upstream { status, body });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        match body.code {
            Some(code) if !code.trim().is_empty() => Ok(code),
            _ => Err(GenerationError::InvalidResponse(
                "response did not include code".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ChainType;
    use crate::storage::ProjectType;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn config(base_url: &str, api_key: Option<&str>) -> GenerationConfig {
        GenerationConfig {
            api_key: api_key.map(str::to_string),
            base_url: url::Url::parse(base_url).unwrap(),
            timeout: Duration::from_secs(5),
        }
    }

    fn request() -> UpstreamRequest {
        UpstreamRequest {
            prompt: "build a vault".to_string(),
            chain: ChainType::Ethereum,
            kind: ProjectType::Agent,
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_upstream() {
        let generator = HttpCodeGenerator::new(&config("http://127.0.0.1:9", None)).unwrap();
        assert!(!generator.is_configured());
        assert!(matches!(
            generator.generate(&request()).await,
            Err(GenerationError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn posts_prompt_and_returns_code() {
        let app = Router::new().route(
            "/api/generate",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["chain"], "ethereum");
                assert_eq!(body["type"], "agent");
                assert_eq!(body["prompt"], "build a vault");
                Json(json!({ "code": "contract Vault {}" }))
            }),
        );
        let base = serve(app).await;

        let generator = HttpCodeGenerator::new(&config(&format!("{base}/"), Some("sk-test"))).unwrap();
        let code = generator.generate(&request()).await.unwrap();
        assert_eq!(code, "contract Vault {}");
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = serve(app).await;

        let generator = HttpCodeGenerator::new(&config(&base, Some("k"))).unwrap();
        match generator.generate(&request()).await {
            Err(GenerationError::Upstream { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_error_body_is_truncated() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::BAD_GATEWAY, "e".repeat(64 * 1024)) }),
        );
        let base = serve(app).await;

        let generator = HttpCodeGenerator::new(&config(&base, Some("k"))).unwrap();
        match generator.generate(&request()).await {
            Err(GenerationError::Upstream { status, body }) => {
                assert_eq!(status, 502);
                assert!(body.len() <= crate::error::UPSTREAM_BODY_LIMIT + '…'.len_utf8());
                assert!(body.ends_with('…'));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_code_is_invalid() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({ "code": "   " })) }),
        );
        let base = serve(app).await;

        let generator = HttpCodeGenerator::new(&config(&base, Some("k"))).unwrap();
        assert!(matches!(
            generator.generate(&request()).await,
            Err(GenerationError::InvalidResponse(_))
        ));
    }
}
