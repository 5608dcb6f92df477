// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GitHub connection and project export endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::extract::ApiJson;
use crate::{
    auth::Auth,
    error::ApiError,
    github::{export_project, ExportTarget, Repo},
    state::AppState,
    storage::{ProjectRepository, ProjectUpdate, UserRecord, UserRepository},
};

const NOT_CONNECTED: &str = "GitHub not connected";

/// Stored GitHub token of `user_id`, or 400 if none is connected.
fn github_credentials(state: &AppState, user_id: Uuid) -> Result<(String, Option<String>), ApiError> {
    let user: UserRecord = UserRepository::new(&state.db)
        .get(user_id)
        .map_err(|e| ApiError::internal("Failed to fetch user", e))?
        .ok_or_else(|| ApiError::bad_request(NOT_CONNECTED))?;
    let token = user
        .github_access_token
        .ok_or_else(|| ApiError::bad_request(NOT_CONNECTED))?;
    Ok((token, user.github_username))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectGitHubRequest {
    pub github_username: String,
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectGitHubResponse {
    pub success: bool,
    pub github_username: String,
}

#[utoipa::path(
    put,
    path = "/api/github/connect",
    tag = "GitHub",
    security(("bearer" = [])),
    request_body = ConnectGitHubRequest,
    responses(
        (status = 200, description = "Credentials stored", body = ConnectGitHubResponse),
        (status = 400, description = "Missing username or token"),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn connect_github(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<ConnectGitHubRequest>,
) -> Result<Json<ConnectGitHubResponse>, ApiError> {
    let record = UserRepository::new(&state.db)
        .set_github_credentials(user.user_id, &request.github_username, &request.access_token)
        .map_err(|e| ApiError::from_store(e, "User not found", "Failed to connect GitHub"))?;

    info!(user_id = %user.user_id, "GitHub account connected");
    Ok(Json(ConnectGitHubResponse {
        success: true,
        github_username: record.github_username.unwrap_or_default(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReposResponse {
    pub success: bool,
    pub repos: Vec<Repo>,
}

#[utoipa::path(
    get,
    path = "/api/github/repos",
    tag = "GitHub",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Repositories of the connected account", body = ReposResponse),
        (status = 400, description = "GitHub not connected"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "GitHub request failed"),
    )
)]
pub async fn list_repos(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<ReposResponse>, ApiError> {
    let (token, _) = github_credentials(&state, user.user_id)?;
    let repos = state
        .source_host
        .list_repos(&token)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch repositories", e))?;
    Ok(Json(ReposResponse {
        success: true,
        repos,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub project_id: String,
    pub repo_name: String,
    #[serde(default)]
    pub create_new_repo: bool,
    pub repo_description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub success: bool,
    pub repo_url: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/github/export",
    tag = "GitHub",
    security(("bearer" = [])),
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Project exported", body = ExportResponse),
        (status = 400, description = "Missing field or GitHub not connected"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "GitHub request failed"),
    )
)]
pub async fn export(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<ExportRequest>,
) -> Result<Json<ExportResponse>, ApiError> {
    let repo_name = request.repo_name.trim();
    if repo_name.is_empty() {
        return Err(ApiError::bad_request("Repository name is required"));
    }
    let project_id =
        Uuid::parse_str(request.project_id.trim()).map_err(|_| ApiError::not_found("Project not found"))?;

    let projects = ProjectRepository::new(&state.db);
    let project = projects
        .get(user.user_id, project_id)
        .map_err(|e| ApiError::from_store(e, "Project not found", "Failed to export project"))?;
    let (token, github_username) = github_credentials(&state, user.user_id)?;

    let target = ExportTarget {
        repo_name: repo_name.to_string(),
        create_new_repo: request.create_new_repo,
        description: request.repo_description,
        private: request.is_private,
    };
    let repo = export_project(
        state.source_host.as_ref(),
        &token,
        github_username.as_deref(),
        &project,
        &target,
    )
    .await
    .map_err(|e| ApiError::internal("Failed to export project", e))?;

    let recorded = projects.update(
        user.user_id,
        project_id,
        ProjectUpdate {
            github_repo_url: Some(repo.html_url.clone()),
            ..Default::default()
        },
    );
    if let Err(e) = recorded {
        warn!(project_id = %project_id, error = %e, "Failed to record repository URL on project");
    }

    Ok(Json(ExportResponse {
        success: true,
        repo_url: repo.html_url,
        message: "Project exported successfully".to_string(),
    }))
}
