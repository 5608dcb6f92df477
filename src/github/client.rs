// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GitHub REST API client.

use std::time::Duration;

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{GitHubError, NewRepo, Repo, RepoFile, SourceHost};
use crate::error::truncate_upstream_body;

const USER_AGENT: &str = "dapp0-builder";
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const REPOS_PER_PAGE: &str = "100";

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: Url,
    http: Client,
}

impl GitHubClient {
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { base_url, http })
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, GitHubError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::Request(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, GitHubError> {
        let response = builder
            .send()
            .await
            .map_err(|e| GitHubError::Request(format!("{what} failed: {e}")))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        Err(GitHubError::Api {
            status,
            message: truncate_upstream_body(message),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &str,
        what: &str,
    ) -> Result<T, GitHubError> {
        let response = self
            .send(self.authorized(self.http.get(url), token), what)
            .await?;
        response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(format!("{what}: {e}")))
    }

    /// Blob sha of `path`, or `None` if the file does not exist yet.
    async fn existing_sha(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, GitHubError> {
        let url = self.endpoint(
            ["repos", owner, repo, "contents"]
                .into_iter()
                .chain(path.split('/')),
        )?;
        let response = self
            .authorized(self.http.get(url), token)
            .send()
            .await
            .map_err(|e| GitHubError::Request(format!("content lookup failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(GitHubError::Api {
                status: response.status().as_u16(),
                message: truncate_upstream_body(response.text().await.unwrap_or_default()),
            });
        }

        // A directory at `path` yields an array and cannot be overwritten.
        let entry: ContentEntry = response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(format!("content lookup: {e}")))?;
        Ok(Some(entry.sha))
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn list_repos(&self, token: &str) -> Result<Vec<Repo>, GitHubError> {
        let mut url = self.endpoint(["user", "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("per_page", REPOS_PER_PAGE);
        self.get_json(url, token, "list repositories").await
    }

    async fn create_repo(&self, token: &str, repo: &NewRepo) -> Result<Repo, GitHubError> {
        let url = self.endpoint(["user", "repos"])?;
        let body = json!({
            "name": repo.name,
            "description": repo.description,
            "private": repo.private,
            "auto_init": true,
        });
        let response = self
            .send(
                self.authorized(self.http.post(url), token).json(&body),
                "create repository",
            )
            .await?;
        response
            .json()
            .await
            .map_err(|e| GitHubError::InvalidResponse(format!("create repository: {e}")))
    }

    async fn get_repo(&self, token: &str, owner: &str, name: &str) -> Result<Repo, GitHubError> {
        let url = self.endpoint(["repos", owner, name])?;
        self.get_json(url, token, "get repository").await
    }

    async fn authenticated_login(&self, token: &str) -> Result<String, GitHubError> {
        let url = self.endpoint(["user"])?;
        let user: AuthenticatedUser = self.get_json(url, token, "get authenticated user").await?;
        Ok(user.login)
    }

    async fn put_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        file: &RepoFile,
        message: &str,
    ) -> Result<(), GitHubError> {
        let sha = self.existing_sha(token, owner, repo, &file.path).await?;

        let mut body = json!({
            "message": message,
            "content": Base64::encode_string(file.content.as_bytes()),
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let url = self.endpoint(
            ["repos", owner, repo, "contents"]
                .into_iter()
                .chain(file.path.split('/')),
        )?;
        self.send(
            self.authorized(self.http.put(url), token).json(&body),
            "write file",
        )
        .await?;
        Ok(())
    }
}
