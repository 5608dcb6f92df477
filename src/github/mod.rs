// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Source Hosting
//!
//! Export of generated projects to GitHub repositories, using the access
//! token a user stored through `/api/github/connect`.

pub mod client;
pub mod export;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use client::GitHubClient;
pub use export::{build_export_files, export_project, file_extension, ExportTarget};

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GitHub request failed: {0}")]
    Request(String),

    #[error("GitHub returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GitHub response was invalid: {0}")]
    InvalidResponse(String),
}

impl GitHubError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::Api { status: 404, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RepoOwner {
    pub login: String,
}

/// Repository summary as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub clone_url: String,
    pub private: bool,
    pub created_at: String,
    pub updated_at: String,
    pub owner: RepoOwner,
}

/// Parameters for a new repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepo {
    pub name: String,
    pub description: String,
    pub private: bool,
}

/// A file to write into a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    pub path: String,
    pub content: String,
}

/// Remote repository host operations, authenticated per call with the
/// user's access token.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Repositories of the token owner, most recently updated first.
    async fn list_repos(&self, token: &str) -> Result<Vec<Repo>, GitHubError>;

    /// Create a repository (initialised with a first commit) for the token owner.
    async fn create_repo(&self, token: &str, repo: &NewRepo) -> Result<Repo, GitHubError>;

    async fn get_repo(&self, token: &str, owner: &str, name: &str) -> Result<Repo, GitHubError>;

    /// Login of the account the token belongs to.
    async fn authenticated_login(&self, token: &str) -> Result<String, GitHubError>;

    /// Create `file`, or replace it if it already exists.
    async fn put_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        file: &RepoFile,
        message: &str,
    ) -> Result<(), GitHubError>;
}
