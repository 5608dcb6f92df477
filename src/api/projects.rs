// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project CRUD endpoints. Every operation is scoped to the caller.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::extract::ApiJson;
use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{NewProject, ProjectRecord, ProjectRepository, ProjectUpdate},
};

const NOT_FOUND: &str = "Project not found";

/// Malformed ids are indistinguishable from missing projects.
fn parse_project_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(NOT_FOUND))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub success: bool,
    pub projects: Vec<ProjectRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: ProjectRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    /// `frontend` or `agent`.
    #[serde(rename = "type")]
    pub kind: String,
    /// One of the registered chain ids.
    pub chain: String,
    #[serde(default)]
    pub generated_code: Option<String>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub generated_code: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub messages: Option<Vec<Value>>,
    pub is_public: Option<bool>,
    pub github_repo_url: Option<String>,
}

impl From<UpdateProjectRequest> for ProjectUpdate {
    fn from(request: UpdateProjectRequest) -> Self {
        Self {
            name: request.name,
            generated_code: request.generated_code,
            messages: request.messages,
            is_public: request.is_public,
            github_repo_url: request.github_repo_url,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's projects, most recently updated first", body = ProjectListResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<ProjectListResponse>, ApiError> {
    let projects = ProjectRepository::new(&state.db)
        .list_for_user(user.user_id)
        .map_err(|e| ApiError::internal("Failed to fetch projects", e))?;
    Ok(Json(ProjectListResponse {
        success: true,
        projects,
    }))
}

#[utoipa::path(
    get,
    path = "/api/projects/public",
    tag = "Projects",
    responses(
        (status = 200, description = "Public projects, newest first", body = ProjectListResponse),
    )
)]
pub async fn list_public_projects(
    State(state): State<AppState>,
) -> Result<Json<ProjectListResponse>, ApiError> {
    let projects = ProjectRepository::new(&state.db)
        .list_public()
        .map_err(|e| ApiError::internal("Failed to fetch projects", e))?;
    Ok(Json(ProjectListResponse {
        success: true,
        projects,
    }))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    security(("bearer" = [])),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid name, type or chain"),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let project = ProjectRepository::new(&state.db)
        .create(
            user.user_id,
            NewProject {
                name: request.name,
                kind: request.kind,
                chain: request.chain,
                generated_code: request.generated_code,
                messages: request.messages,
                is_public: request.is_public,
            },
        )
        .map_err(|e| ApiError::from_store(e, NOT_FOUND, "Failed to create project"))?;

    info!(user_id = %user.user_id, project_id = %project.id, "Project created");
    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            success: true,
            project,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Project not found"),
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project_id = parse_project_id(&id)?;
    let project = ProjectRepository::new(&state.db)
        .get(user.user_id, project_id)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND, "Failed to fetch project"))?;
    Ok(Json(ProjectResponse {
        success: true,
        project,
    }))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 400, description = "No fields to update"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Project not found"),
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project_id = parse_project_id(&id)?;
    let project = ProjectRepository::new(&state.db)
        .update(user.user_id, project_id, request.into())
        .map_err(|e| ApiError::from_store(e, NOT_FOUND, "Failed to update project"))?;
    Ok(Json(ProjectResponse {
        success: true,
        project,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Project not found"),
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let project_id = parse_project_id(&id)?;
    ProjectRepository::new(&state.db)
        .delete(user.user_id, project_id)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND, "Failed to delete project"))?;

    info!(user_id = %user.user_id, project_id = %project_id, "Project deleted");
    Ok(Json(MessageResponse {
        success: true,
        message: "Project deleted successfully".to_string(),
    }))
}
