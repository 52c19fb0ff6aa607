//! Commit history, deployment history, and retained backups.

use serde::Serialize;
use std::path::Path;

use crate::services::deploy::{list_backups, BackupInfo};
use crate::services::github::GithubClient;
use crate::services::locator::RepoLocator;
use crate::services::store::ProjectStore;
use crate::types::errors::CommandResult;
use crate::types::project::{CommitInfo, DeploymentRecord};

/// Upstream commits alongside what was actually deployed, so a UI can
/// mark deployable/restorable revisions.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectHistory {
    pub commits: Vec<CommitInfo>,
    pub deployments: Vec<DeploymentRecord>,
    pub deployed_sha: Option<String>,
}

pub async fn get_commit_history(
    store: &ProjectStore,
    client: &GithubClient,
    id: &str,
    per_page: u32,
) -> CommandResult<ProjectHistory> {
    let project = store.get(id).await?;
    let locator = RepoLocator::parse(&project.locator)?;

    let commits = client
        .commit_history(&locator, &project.branch, per_page)
        .await?;

    Ok(ProjectHistory {
        commits,
        deployments: project.history,
        deployed_sha: project.deployed_commit,
    })
}

/// Backups retained next to the project's target directory, newest
/// first.
pub async fn list_project_backups(
    store: &ProjectStore,
    content_dir: &Path,
    id: &str,
) -> CommandResult<Vec<BackupInfo>> {
    let project = store.get(id).await?;
    let target = project
        .target_dir(content_dir)
        .map_err(|e| crate::types::errors::CommandError::Validation(e.to_string()))?;
    Ok(list_backups(&target))
}
