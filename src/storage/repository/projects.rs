// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project repository.
//!
//! Every read and write is scoped by `(project_id, user_id)`. The per-user
//! index `user_id|project_id` backs listing; public listing scans the
//! primary table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::chains::ChainType;
use crate::storage::database::{
    decode_row, make_index_key, read_row, scan_children, write_row, Database, StoreError,
    StoreResult, PROJECTS, USER_PROJECT_INDEX,
};
use crate::storage::ownership::{OwnedResource, OwnershipCheck};

/// What a project generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// React dApp front end.
    Frontend,
    /// On-chain program or off-chain agent.
    Agent,
}

impl ProjectType {
    pub const ALL: [ProjectType; 2] = [ProjectType::Frontend, ProjectType::Agent];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Frontend => "frontend",
            ProjectType::Agent => "agent",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StoreError::Constraint {
                column: "type",
                value: s.to_string(),
            })
    }
}

/// Stored project row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub chain: ChainType,
    pub generated_code: Option<String>,
    /// Chat transcript; opaque to the server.
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<serde_json::Value>,
    pub is_public: bool,
    pub github_repo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for ProjectRecord {
    const RESOURCE: &'static str = "Project";

    fn owner_user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Column values for a new project, as received from the client.
///
/// `kind` and `chain` are checked against their enumerations on insert.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub kind: String,
    pub chain: String,
    pub generated_code: Option<String>,
    pub messages: Vec<serde_json::Value>,
    pub is_public: bool,
}

/// Partial project update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub generated_code: Option<String>,
    pub messages: Option<Vec<serde_json::Value>>,
    pub is_public: Option<bool>,
    pub github_repo_url: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.generated_code.is_none()
            && self.messages.is_none()
            && self.is_public.is_none()
            && self.github_repo_url.is_none()
    }
}

/// Repository for user projects.
pub struct ProjectRepository<'a> {
    db: &'a Database,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, user_id: Uuid, new: NewProject) -> StoreResult<ProjectRecord> {
        let name = validate_name(&new.name)?;
        let kind: ProjectType = new.kind.parse()?;
        let chain: ChainType = new.chain.parse().map_err(|_| StoreError::Constraint {
            column: "chain",
            value: new.chain.clone(),
        })?;

        let now = Utc::now();
        let project = ProjectRecord {
            id: Uuid::new_v4(),
            user_id,
            name,
            kind,
            chain,
            generated_code: new.generated_code,
            messages: new.messages,
            is_public: new.is_public,
            github_repo_url: None,
            created_at: now,
            updated_at: now,
        };

        let project_key = project.id.to_string();
        let index_key = make_index_key(&user_id.to_string(), &project_key);
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut projects = write_txn.open_table(PROJECTS)?;
            write_row(&mut projects, &project_key, &project)?;
            let mut index = write_txn.open_table(USER_PROJECT_INDEX)?;
            index.insert(index_key.as_str(), project_key.as_str())?;
        }
        write_txn.commit()?;
        Ok(project)
    }

    /// Fetch a project owned by `user_id`.
    pub fn get(&self, user_id: Uuid, project_id: Uuid) -> StoreResult<ProjectRecord> {
        let read_txn = self.db.inner().begin_read()?;
        let projects = read_txn.open_table(PROJECTS)?;
        read_row::<ProjectRecord>(&projects, &project_id.to_string()).owned_by(user_id)
    }

    /// All projects of `user_id`, most recently updated first.
    pub fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ProjectRecord>> {
        let read_txn = self.db.inner().begin_read()?;
        let index = read_txn.open_table(USER_PROJECT_INDEX)?;
        let projects = read_txn.open_table(PROJECTS)?;

        let mut owned = Vec::new();
        for project_id in scan_children(&index, &user_id.to_string())? {
            if let Some(project) = read_row::<ProjectRecord>(&projects, &project_id)? {
                owned.push(project);
            }
        }
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    /// Projects flagged public by any user, newest first.
    pub fn list_public(&self) -> StoreResult<Vec<ProjectRecord>> {
        let read_txn = self.db.inner().begin_read()?;
        let projects = read_txn.open_table(PROJECTS)?;

        let mut public = Vec::new();
        for entry in projects.iter()? {
            let (_, value) = entry?;
            let project: ProjectRecord = decode_row(value.value())?;
            if project.is_public {
                public.push(project);
            }
        }
        public.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(public)
    }

    /// Write the provided fields and bump `updated_at`.
    pub fn update(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        update: ProjectUpdate,
    ) -> StoreResult<ProjectRecord> {
        if update.is_empty() {
            return Err(StoreError::InvalidUpdate("No fields to update".to_string()));
        }
        let name = update.name.as_deref().map(validate_name).transpose()?;

        let project_key = project_id.to_string();
        let write_txn = self.db.inner().begin_write()?;
        let project = {
            let mut projects = write_txn.open_table(PROJECTS)?;
            let mut project =
                read_row::<ProjectRecord>(&projects, &project_key).owned_by(user_id)?;

            if let Some(name) = name {
                project.name = name;
            }
            if let Some(code) = update.generated_code {
                project.generated_code = Some(code);
            }
            if let Some(messages) = update.messages {
                project.messages = messages;
            }
            if let Some(is_public) = update.is_public {
                project.is_public = is_public;
            }
            if let Some(url) = update.github_repo_url {
                project.github_repo_url = Some(url);
            }
            project.updated_at = Utc::now();

            write_row(&mut projects, &project_key, &project)?;
            project
        };
        write_txn.commit()?;
        Ok(project)
    }

    /// Hard delete. Missing and foreign projects are both `NotFound`.
    pub fn delete(&self, user_id: Uuid, project_id: Uuid) -> StoreResult<()> {
        let project_key = project_id.to_string();
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut projects = write_txn.open_table(PROJECTS)?;
            read_row::<ProjectRecord>(&projects, &project_key).owned_by(user_id)?;
            projects.remove(project_key.as_str())?;

            let mut index = write_txn.open_table(USER_PROJECT_INDEX)?;
            index.remove(make_index_key(&user_id.to_string(), &project_key).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

fn validate_name(raw: &str) -> StoreResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(StoreError::Constraint {
            column: "name",
            value: raw.to_string(),
        });
    }
    Ok(name.to_string())
}
