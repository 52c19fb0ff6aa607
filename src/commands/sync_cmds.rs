//! Update checks, syncs, restores, and branch listing.

use serde::Serialize;

use crate::services::github::GithubClient;
use crate::services::locator::RepoLocator;
use crate::services::store::ProjectStore;
use crate::services::sync::SyncService;
use crate::types::errors::{CommandResult, StoreError, SyncError};
use crate::types::project::{CommitInfo, SyncOutcome};

/// Result of [`check_for_update`].
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCheck {
    pub has_update: bool,
    pub commit: CommitInfo,
}

/// Refresh the cached upstream tip and report whether it differs from
/// what is deployed. Never touches the target directory.
pub async fn check_for_update(
    store: &ProjectStore,
    client: &GithubClient,
    id: &str,
) -> CommandResult<UpdateCheck> {
    let project = store.get(id).await?;
    let locator = RepoLocator::parse(&project.locator)?;

    let commit = client.latest_commit(&locator, &project.branch).await?;
    store.set_last_known_commit(id, commit.clone()).await?;

    let has_update = project.deployed_commit.as_deref() != Some(commit.sha.as_str());
    Ok(UpdateCheck { has_update, commit })
}

/// Sync the project to the tip of its tracked branch.
///
/// Pipeline failures come back as an unsuccessful [`SyncOutcome`] with
/// a machine-checkable reason; only an unknown project id is an error.
pub async fn sync_now(service: &SyncService, id: &str) -> CommandResult<SyncOutcome> {
    into_outcome(service.sync_project(id).await)
}

/// Deploy an exact commit from the project's history.
pub async fn restore_to_commit(
    service: &SyncService,
    id: &str,
    sha: &str,
) -> CommandResult<SyncOutcome> {
    into_outcome(service.restore_commit(id, sha).await)
}

fn into_outcome(result: Result<SyncOutcome, SyncError>) -> CommandResult<SyncOutcome> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(SyncError::Store(StoreError::NotFound { id })) => {
            Err(StoreError::NotFound { id }.into())
        }
        Err(error) => {
            log::warn!("Sync failed: {error}");
            Ok(SyncOutcome::failure(&error))
        }
    }
}

/// Branch names of a repository, for branch pickers.
pub async fn list_branches(client: &GithubClient, repo_url: &str) -> CommandResult<Vec<String>> {
    let locator = RepoLocator::parse(repo_url)?;
    Ok(client.branches(&locator).await?)
}
