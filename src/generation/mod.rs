// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Code Generation
//!
//! Proxy to the hosted code generator.
//!
//! - [`prompt`] wraps user requests with chain and project-type context
//! - [`client`] talks to the upstream service over HTTP
//! - [`fallback`] holds the static code served when the upstream fails
//! - [`ui`] shapes standalone UI component requests
//!
//! Project generation makes one upstream attempt and falls back to a
//! template on any failure; UI generation has no fallback.

pub mod client;
pub mod fallback;
pub mod prompt;
pub mod ui;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::chains::ChainType;
use crate::storage::ProjectType;

pub use client::HttpCodeGenerator;
pub use fallback::fallback_code;
pub use prompt::build_enhanced_prompt;
pub use ui::{build_component_prompt, extract_components, UiKind};

/// Warning attached to responses served from a fallback template.
pub const FALLBACK_WARNING: &str = "Using fallback code generation";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation backend is not configured")]
    NotConfigured,

    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation backend returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("generation backend response was invalid: {0}")]
    InvalidResponse(String),
}

/// Body sent to the upstream generator.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamRequest {
    pub prompt: String,
    pub chain: ChainType,
    #[serde(rename = "type")]
    pub kind: ProjectType,
}

/// A source of generated code.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Whether an upstream call can be attempted at all.
    fn is_configured(&self) -> bool;

    async fn generate(&self, request: &UpstreamRequest) -> Result<String, GenerationError>;
}

/// Result of a project generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: String,
    /// Set when `code` came from a fallback template.
    pub warning: Option<&'static str>,
}

/// Generate project code, serving the static template for `(kind, chain)`
/// when the upstream call fails.
pub async fn generate_with_fallback(
    generator: &dyn CodeGenerator,
    prompt: &str,
    kind: ProjectType,
    chain: ChainType,
) -> GeneratedCode {
    let request = UpstreamRequest {
        prompt: build_enhanced_prompt(prompt, kind, chain),
        chain,
        kind,
    };

    match generator.generate(&request).await {
        Ok(code) => GeneratedCode {
            code,
            warning: None,
        },
        Err(e) => {
            warn!(error = %e, chain = %chain, kind = %kind, "Code generation failed, using fallback");
            GeneratedCode {
                code: fallback_code(kind, chain, prompt),
                warning: Some(FALLBACK_WARNING),
            }
        }
    }
}

/// Generated UI code and the components it exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUi {
    pub code: String,
    pub components: Vec<String>,
}

/// Generate a standalone UI artefact. UI requests are framed as Solana
/// frontend work upstream.
pub async fn generate_ui(
    generator: &dyn CodeGenerator,
    prompt: &str,
    kind: UiKind,
    context: Option<&str>,
) -> Result<GeneratedUi, GenerationError> {
    let component_prompt = build_component_prompt(prompt, kind, context);
    let request = UpstreamRequest {
        prompt: build_enhanced_prompt(&component_prompt, ProjectType::Frontend, ChainType::Solana),
        chain: ChainType::Solana,
        kind: ProjectType::Frontend,
    };

    let code = generator.generate(&request).await?;
    let components = extract_components(&code);
    Ok(GeneratedUi { code, components })
}
