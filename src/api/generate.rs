// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Code generation endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::ApiJson;
use crate::{
    chains::ChainType,
    error::ApiError,
    generation::{generate_ui, generate_with_fallback, UiKind},
    state::AppState,
    storage::ProjectType,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub chain: ChainType,
    /// Echoed back; a fresh id is assigned when absent.
    pub project_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub code: String,
    pub chain: ChainType,
    pub project_id: String,
    pub timestamp: DateTime<Utc>,
    /// Present when the code came from a fallback template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "Generation",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated code, possibly from a fallback template", body = GenerateResponse),
        (status = 400, description = "Empty prompt or unknown type/chain"),
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }

    let generated = generate_with_fallback(
        state.generator.as_ref(),
        &request.prompt,
        request.kind,
        request.chain,
    )
    .await;

    let project_id = request
        .project_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    Ok(Json(GenerateResponse {
        success: true,
        code: generated.code,
        chain: request.chain,
        project_id,
        timestamp: Utc::now(),
        warning: generated.warning.map(str::to_string),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateUiRequest {
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: UiKind,
    pub context: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateUiResponse {
    pub success: bool,
    pub code: String,
    /// Exported component names found in `code`.
    pub components: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/api/generate-ui",
    tag = "Generation",
    request_body = GenerateUiRequest,
    responses(
        (status = 200, description = "Generated UI code", body = GenerateUiResponse),
        (status = 400, description = "Empty prompt or unknown type"),
        (status = 500, description = "Generation backend failed"),
    )
)]
pub async fn generate_ui_component(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateUiRequest>,
) -> Result<Json<GenerateUiResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }

    let generated = generate_ui(
        state.generator.as_ref(),
        &request.prompt,
        request.kind,
        request.context.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal("Failed to generate UI component", e))?;

    Ok(Json(GenerateUiResponse {
        success: true,
        code: generated.code,
        components: generated.components,
        timestamp: Utc::now(),
    }))
}
