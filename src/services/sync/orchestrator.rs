//! The sync pipeline: fetch → extract → replace → record.
//!
//! One invocation per project at a time; each stage's output feeds the
//! next, and the downloaded archive and extraction workspace are scoped
//! temp resources released on every exit path.

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::services::archive::extract_archive;
use crate::services::config::AppConfig;
use crate::services::deploy::replace_directory;
use crate::services::github::{download_archive, ArchiveRef, GithubClient};
use crate::services::locator::RepoLocator;
use crate::services::store::ProjectStore;
use crate::services::sync::operation_lock::OperationLock;
use crate::types::errors::SyncError;
use crate::types::project::{CommitInfo, Project, SyncOutcome};

pub struct SyncService {
    client: GithubClient,
    store: Arc<ProjectStore>,
    content_dir: PathBuf,
    /// Scratch space for downloaded archives and extraction workspaces.
    work_dir: PathBuf,
    locks: OperationLock,
}

impl SyncService {
    pub fn new(
        client: GithubClient,
        store: Arc<ProjectStore>,
        content_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            store,
            content_dir: content_dir.into(),
            work_dir: std::env::temp_dir(),
            locks: OperationLock::new(),
        }
    }

    /// Wire up a service from environment configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, SyncError> {
        let client = GithubClient::new(config.github_token.clone())?;
        let store = Arc::new(ProjectStore::open(&config.store_path)?);
        Ok(Self::new(client, store, &config.content_dir))
    }

    /// Override the scratch directory (tests, constrained hosts).
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn content_dir(&self) -> &std::path::Path {
        &self.content_dir
    }

    /// Sync a project to the tip of its tracked branch.
    pub async fn sync_project(&self, id: &str) -> Result<SyncOutcome, SyncError> {
        let project = self.store.get(id).await?;
        let _guard = self
            .locks
            .acquire(&project.id)
            .ok_or(SyncError::SyncInProgress)?;

        let locator = RepoLocator::parse(&project.locator)?;
        let commit = self.client.latest_commit(&locator, &project.branch).await?;
        let target_ref = ArchiveRef::Branch(project.branch.clone());

        self.run_pipeline(&project, &locator, target_ref, commit)
            .await
    }

    /// Deploy an exact commit, e.g. to revert a bad sync.
    pub async fn restore_commit(&self, id: &str, sha: &str) -> Result<SyncOutcome, SyncError> {
        let project = self.store.get(id).await?;
        let _guard = self
            .locks
            .acquire(&project.id)
            .ok_or(SyncError::SyncInProgress)?;

        let locator = RepoLocator::parse(&project.locator)?;
        // Resolve the commit's own metadata so the deployment record
        // carries its message and timestamp, not the branch tip's.
        let commit = self.client.latest_commit(&locator, sha).await?;
        let target_ref = ArchiveRef::Commit(commit.sha.clone());

        self.run_pipeline(&project, &locator, target_ref, commit)
            .await
    }

    async fn run_pipeline(
        &self,
        project: &Project,
        locator: &RepoLocator,
        target_ref: ArchiveRef,
        commit: CommitInfo,
    ) -> Result<SyncOutcome, SyncError> {
        let target = project.target_dir(&self.content_dir)?;

        log::info!(
            "Syncing {} ({}) to {}@{}",
            project.local_name,
            project.id,
            locator,
            target_ref.describe()
        );

        // Both temp resources are dropped (and deleted) on every exit
        // path below, including the `?` ones.
        let archive = download_archive(&self.client, locator, &target_ref, &self.work_dir).await?;
        let workspace = TempDir::with_prefix_in("gitpress-extract-", &self.work_dir)
            .map_err(SyncError::Workspace)?;

        let source = extract_archive(archive.path(), workspace.path())?;
        let report = replace_directory(&source, &target)?;

        self.store.record_deployment(&project.id, &commit).await?;

        log::info!(
            "Deployed {}@{} into {} ({} files)",
            locator,
            commit.sha,
            report.target.display(),
            report.files_copied
        );

        Ok(SyncOutcome {
            success: true,
            message: format!(
                "Deployed commit {} into {}",
                short_sha(&commit.sha),
                report.target.display()
            ),
            reason: None,
            target_dir: Some(report.target.to_string_lossy().into_owned()),
            sha: Some(commit.sha),
            backup: report
                .backup
                .map(|p| p.to_string_lossy().into_owned()),
        })
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
