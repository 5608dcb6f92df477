// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use tracing::info;

use super::{GitHubError, NewRepo, Repo, RepoFile, SourceHost};
use crate::chains::ChainType;
use crate::storage::{ProjectRecord, ProjectType};

const README_PATH: &str = "README.md";
const EMPTY_CODE_PLACEHOLDER: &str = "// No code generated yet";

/// Where an export goes.
#[derive(Debug, Clone)]
pub struct ExportTarget {
    pub repo_name: String,
    pub create_new_repo: bool,
    pub description: Option<String>,
    pub private: bool,
}

/// Extension of the exported source file.
pub fn file_extension(kind: ProjectType, chain: ChainType) -> &'static str {
    match kind {
        ProjectType::Frontend => "tsx",
        ProjectType::Agent => chain.config().agent_extension,
    }
}

fn fence_language(extension: &str) -> &str {
    match extension {
        "rs" => "rust",
        "sol" => "solidity",
        "js" => "javascript",
        other => other,
    }
}

/// README plus, when code exists, `src/main.{ext}`.
pub fn build_export_files(project: &ProjectRecord) -> Vec<RepoFile> {
    let extension = file_extension(project.kind, project.chain);
    let code = project
        .generated_code
        .as_deref()
        .filter(|code| !code.is_empty());

    let readme = format!(
        "# {name}\n\nGenerated with dApp0\n\n## Description\n\nThis is a {kind} project for {chain}.\n\n## Generated Code\n\n```{fence}\n{code}\n```\n",
        name = project.name,
        kind = project.kind,
        chain = project.chain.config().name,
        fence = fence_language(extension),
        code = code.unwrap_or(EMPTY_CODE_PLACEHOLDER),
    );

    let mut files = vec![RepoFile {
        path: README_PATH.to_string(),
        content: readme,
    }];
    if let Some(code) = code {
        files.push(RepoFile {
            path: format!("src/main.{extension}"),
            content: code.to_string(),
        });
    }
    files
}

/// Create or look up the target repository and write the project files.
///
/// Existing repositories are looked up under `github_username`; files are
/// written as the token's account.
pub async fn export_project(
    host: &dyn SourceHost,
    token: &str,
    github_username: Option<&str>,
    project: &ProjectRecord,
    target: &ExportTarget,
) -> Result<Repo, GitHubError> {
    let repo = if target.create_new_repo {
        let description = target
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Generated {} for {}", project.kind, project.chain));
        host.create_repo(
            token,
            &NewRepo {
                name: target.repo_name.clone(),
                description,
                private: target.private,
            },
        )
        .await?
    } else {
        let owner = match github_username {
            Some(owner) => owner.to_string(),
            None => host.authenticated_login(token).await?,
        };
        host.get_repo(token, &owner, &target.repo_name).await?
    };

    let owner = host.authenticated_login(token).await?;
    let message = format!("Initial commit: {}", project.name);
    for file in build_export_files(project) {
        host.put_file(token, &owner, &repo.name, &file, &message)
            .await?;
    }

    info!(
        project_id = %project.id,
        repo = %repo.full_name,
        "Exported project to GitHub"
    );
    Ok(repo)
}
