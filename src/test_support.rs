// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::auth::{NonceIssuer, SessionIssuer};
use crate::chains::ChainType;
use crate::generation::{CodeGenerator, GenerationError, UpstreamRequest};
use crate::github::{GitHubError, NewRepo, Repo, RepoFile, RepoOwner, SourceHost};
use crate::state::AppState;
use crate::storage::{Database, ProjectRecord, ProjectType};

pub const TEST_SESSION_SECRET: &[u8] = b"test-session-secret-0123456789abcdef";

/// State backed by a fresh database, a failing generator and a fake
/// GitHub account named `octo`.
pub fn test_state() -> (AppState, TempDir) {
    test_state_with(Arc::new(FailingGenerator), Arc::new(FakeSourceHost::new("octo")))
}

pub fn test_state_with(
    generator: Arc<dyn CodeGenerator>,
    source_host: Arc<dyn SourceHost>,
) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("test.redb")).unwrap();
    let state = AppState::new(
        Arc::new(db),
        SessionIssuer::new(TEST_SESSION_SECRET, "dapp0", Duration::from_secs(3600)),
        NonceIssuer::new(Duration::from_secs(300)),
        generator,
        source_host,
    );
    (state, dir)
}

pub fn sample_project(kind: ProjectType, chain: ChainType) -> ProjectRecord {
    let now = Utc::now();
    ProjectRecord {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Sample dApp".to_string(),
        kind,
        chain,
        generated_code: None,
        messages: Vec::new(),
        is_public: false,
        github_repo_url: None,
        created_at: now,
        updated_at: now,
    }
}

/// Generator that always returns the same code and remembers the last call.
#[derive(Default)]
pub struct StaticGenerator {
    code: String,
    last: Mutex<Option<UpstreamRequest>>,
}

impl StaticGenerator {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            last: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<UpstreamRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeGenerator for StaticGenerator {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, request: &UpstreamRequest) -> Result<String, GenerationError> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(self.code.clone())
    }
}

/// Generator whose upstream is always down.
pub struct FailingGenerator;

#[async_trait]
impl CodeGenerator for FailingGenerator {
    fn is_configured(&self) -> bool {
        false
    }

    async fn generate(&self, _request: &UpstreamRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Upstream {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// In-memory GitHub account.
pub struct FakeSourceHost {
    login: String,
    repos: Mutex<Vec<Repo>>,
    created: Mutex<Vec<NewRepo>>,
    written: Mutex<Vec<(String, RepoFile)>>,
}

impl FakeSourceHost {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            repos: Mutex::default(),
            created: Mutex::default(),
            written: Mutex::default(),
        }
    }

    /// Add an existing repository owned by the fake account.
    pub fn with_repo(self, name: &str) -> Self {
        let repo = self.repo(name, None, false);
        self.repos.lock().unwrap().push(repo);
        self
    }

    pub fn created_repos(&self) -> Vec<NewRepo> {
        self.created.lock().unwrap().clone()
    }

    /// `(owner/repo, file)` for every write, in order.
    pub fn written_files(&self) -> Vec<(String, RepoFile)> {
        self.written.lock().unwrap().clone()
    }

    fn repo(&self, name: &str, description: Option<String>, private: bool) -> Repo {
        Repo {
            id: 1,
            name: name.to_string(),
            full_name: format!("{}/{name}", self.login),
            description,
            html_url: format!("https://github.com/{}/{name}", self.login),
            clone_url: format!("https://github.com/{}/{name}.git", self.login),
            private,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
            owner: RepoOwner {
                login: self.login.clone(),
            },
        }
    }

    fn not_found() -> GitHubError {
        GitHubError::Api {
            status: 404,
            message: "Not Found".to_string(),
        }
    }
}

#[async_trait]
impl SourceHost for FakeSourceHost {
    async fn list_repos(&self, _token: &str) -> Result<Vec<Repo>, GitHubError> {
        Ok(self.repos.lock().unwrap().clone())
    }

    async fn create_repo(&self, _token: &str, repo: &NewRepo) -> Result<Repo, GitHubError> {
        let created = self.repo(&repo.name, Some(repo.description.clone()), repo.private);
        self.created.lock().unwrap().push(repo.clone());
        self.repos.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn get_repo(&self, _token: &str, owner: &str, name: &str) -> Result<Repo, GitHubError> {
        self.repos
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.owner.login == owner && r.name == name)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn authenticated_login(&self, _token: &str) -> Result<String, GitHubError> {
        Ok(self.login.clone())
    }

    async fn put_file(
        &self,
        _token: &str,
        owner: &str,
        repo: &str,
        file: &RepoFile,
        _message: &str,
    ) -> Result<(), GitHubError> {
        self.written
            .lock()
            .unwrap()
            .push((format!("{owner}/{repo}"), file.clone()));
        Ok(())
    }
}
