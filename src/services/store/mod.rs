//! Persisted project collection.
//!
//! All projects live in one JSON file, loaded and saved as a whole
//! unit. Every mutation runs as read-modify-write under a single async
//! mutex, so two concurrent syncs can never silently drop each other's
//! update, and the file itself is replaced atomically.

use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::services::fs_utils::file_utils::write_atomic;
use crate::types::errors::StoreError;
use crate::types::project::{CommitInfo, DeploymentRecord, Project};
use crate::DEPLOY_HISTORY_LIMIT;

pub struct ProjectStore {
    path: PathBuf,
    projects: Mutex<Vec<Project>>,
}

impl ProjectStore {
    /// Open the collection at `path`. A missing file reads as an empty
    /// collection; a malformed one is an error, not silent data loss.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let projects = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| StoreError::Io {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            projects: Mutex::new(projects),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The single mutation point: run `mutate` against the collection
    /// under the lock, persist, and return its result. The in-memory
    /// state is only updated if the save succeeds.
    async fn update<R>(
        &self,
        mutate: impl FnOnce(&mut Vec<Project>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut projects = self.projects.lock().await;
        let mut working = projects.clone();
        let result = mutate(&mut working)?;
        self.save(&working)?;
        *projects = working;
        Ok(result)
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(projects)?;
        write_atomic(&self.path, &json).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    pub async fn list(&self) -> Vec<Project> {
        self.projects.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<Project, StoreError> {
        self.projects
            .lock()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    /// Add a project. Two projects must never share a target directory,
    /// so (kind, local name) pairs are rejected as duplicates here.
    pub async fn insert(&self, project: Project) -> Result<Project, StoreError> {
        self.update(move |projects| {
            if let Some(existing) = projects
                .iter()
                .find(|p| p.kind == project.kind && p.local_name == project.local_name)
            {
                return Err(StoreError::DuplicateTarget {
                    path: Path::new(existing.kind.subdir()).join(&existing.local_name),
                });
            }
            projects.push(project.clone());
            Ok(project)
        })
        .await
    }

    /// Remove the record only; deployed files on disk are untouched.
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.update(move |projects| {
            let before = projects.len();
            projects.retain(|p| p.id != id);
            if projects.len() == before {
                return Err(StoreError::NotFound { id });
            }
            Ok(())
        })
        .await
    }

    /// Mutate one project in place and persist the whole collection.
    pub async fn update_project<R>(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut Project) -> R,
    ) -> Result<R, StoreError> {
        let id = id.to_string();
        self.update(move |projects| {
            let project = projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(StoreError::NotFound { id })?;
            Ok(mutate(project))
        })
        .await
    }

    /// Refresh the cached upstream tip without touching deployment state.
    pub async fn set_last_known_commit(
        &self,
        id: &str,
        commit: CommitInfo,
    ) -> Result<(), StoreError> {
        self.update_project(id, |project| {
            project.last_known_commit = Some(commit);
        })
        .await
    }

    /// Prepend a deployment record stamped with the current time and
    /// trim the history to the most recent entries. The only mutation
    /// path for history.
    pub async fn append_record(
        &self,
        id: &str,
        commit: &CommitInfo,
    ) -> Result<DeploymentRecord, StoreError> {
        let commit = commit.clone();
        self.update_project(id, move |project| push_record(project, &commit))
            .await
    }

    /// Record a successful deployment: deployed commit, last sync time,
    /// and a history record, all in one persisted step.
    pub async fn record_deployment(
        &self,
        id: &str,
        commit: &CommitInfo,
    ) -> Result<DeploymentRecord, StoreError> {
        let commit = commit.clone();
        self.update_project(id, move |project| {
            let record = push_record(project, &commit);
            project.deployed_commit = Some(commit.sha.clone());
            project.last_sync = Some(record.deployed_at);
            record
        })
        .await
    }

    pub async fn get_history(&self, id: &str) -> Result<Vec<DeploymentRecord>, StoreError> {
        Ok(self.get(id).await?.history)
    }

    pub async fn get_deployed_commit(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(id).await?.deployed_commit)
    }
}

fn push_record(project: &mut Project, commit: &CommitInfo) -> DeploymentRecord {
    let record = DeploymentRecord {
        sha: commit.sha.clone(),
        message: commit.message.clone(),
        commit_timestamp: commit.timestamp,
        deployed_at: chrono::Utc::now(),
    };
    project.history.insert(0, record.clone());
    project.history.truncate(DEPLOY_HISTORY_LIMIT);
    record
}
