// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{NonceIssuer, SessionIssuer};
use crate::config::AppConfig;
use crate::generation::{CodeGenerator, HttpCodeGenerator};
use crate::github::{GitHubClient, SourceHost};
use crate::storage::Database;

/// Shared collaborators handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<SessionIssuer>,
    pub nonces: NonceIssuer,
    pub generator: Arc<dyn CodeGenerator>,
    pub source_host: Arc<dyn SourceHost>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        sessions: SessionIssuer,
        nonces: NonceIssuer,
        generator: Arc<dyn CodeGenerator>,
        source_host: Arc<dyn SourceHost>,
    ) -> Self {
        Self {
            db,
            sessions: Arc::new(sessions),
            nonces,
            generator,
            source_host,
        }
    }

    /// Wire the production collaborators described by `config`.
    pub fn from_config(config: &AppConfig, db: Arc<Database>) -> Result<Self, reqwest::Error> {
        let sessions = SessionIssuer::new(
            &config.session_secret,
            config.session_issuer.clone(),
            config.session_ttl,
        );
        let generator = HttpCodeGenerator::new(&config.generation)?;
        let source_host = GitHubClient::new(config.github_api_base_url.clone())?;

        Ok(Self::new(
            db,
            sessions,
            NonceIssuer::new(config.nonce_ttl),
            Arc::new(generator),
            Arc::new(source_host),
        ))
    }
}
