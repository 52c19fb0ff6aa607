//! Project lifecycle: add, list, delete.

use serde::Deserialize;

use crate::services::fs_utils::path_utils::is_safe_dir_name;
use crate::services::github::GithubClient;
use crate::services::locator::RepoLocator;
use crate::services::store::ProjectStore;
use crate::types::errors::{CommandError, CommandResult};
use crate::types::project::{Project, ProjectKind};

/// Input for [`add_project`], as a control surface would post it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub repo_url: String,
    /// "theme" or "plugin".
    pub kind: String,
    /// Directory name under the deployment root.
    pub local_name: String,
    pub branch: String,
}

/// Validate and register a new tracked project.
///
/// The upstream tip lookup is best effort: an unreachable GitHub must
/// not block adding a project.
pub async fn add_project(
    store: &ProjectStore,
    client: &GithubClient,
    input: NewProject,
) -> CommandResult<Project> {
    let locator = RepoLocator::parse(&input.repo_url)?;

    let kind = ProjectKind::parse(&input.kind)
        .ok_or_else(|| CommandError::Validation(format!("unknown project kind: {}", input.kind)))?;

    let local_name = input.local_name.trim();
    if !is_safe_dir_name(local_name) {
        return Err(CommandError::Validation(format!(
            "invalid local directory name: {:?}",
            input.local_name
        )));
    }

    let branch = input.branch.trim();
    if branch.is_empty() {
        return Err(CommandError::Validation("branch must not be empty".into()));
    }

    let mut project = Project::new(&locator, kind, local_name, branch);

    match client.latest_commit(&locator, branch).await {
        Ok(commit) => project.last_known_commit = Some(commit),
        Err(e) => log::warn!("Could not fetch latest commit for {locator}: {e}"),
    }

    Ok(store.insert(project).await?)
}

pub async fn list_projects(store: &ProjectStore) -> Vec<Project> {
    store.list().await
}

/// Remove the project record. Deployed files and backups stay on disk.
pub async fn delete_project(store: &ProjectStore, id: &str) -> CommandResult<()> {
    store.remove(id).await?;
    log::info!("Project {id} deleted (files on disk untouched)");
    Ok(())
}
