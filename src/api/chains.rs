// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::Path, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    chains::{all_chains, ChainConfig, ChainType},
    error::ApiError,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ChainListResponse {
    pub success: bool,
    pub chains: Vec<ChainConfig>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChainResponse {
    pub success: bool,
    pub chain: ChainConfig,
}

#[utoipa::path(
    get,
    path = "/api/chains",
    tag = "Chains",
    responses((status = 200, description = "All supported chains", body = ChainListResponse))
)]
pub async fn list_chains() -> Json<ChainListResponse> {
    Json(ChainListResponse {
        success: true,
        chains: all_chains().to_vec(),
    })
}

#[utoipa::path(
    get,
    path = "/api/chains/{chain}",
    tag = "Chains",
    params(("chain" = String, Path, description = "Chain id, e.g. `solana`")),
    responses(
        (status = 200, description = "Chain configuration", body = ChainResponse),
        (status = 404, description = "Unknown chain"),
    )
)]
pub async fn get_chain(Path(chain): Path<String>) -> Result<Json<ChainResponse>, ApiError> {
    let chain: ChainType = chain
        .parse()
        .map_err(|_| ApiError::not_found("Chain not found"))?;
    Ok(Json(ChainResponse {
        success: true,
        chain: *chain.config(),
    }))
}
