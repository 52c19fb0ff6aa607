//! Core records for tracked projects and their deployment history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::services::fs_utils::path_utils::is_safe_dir_name;
use crate::services::locator::RepoLocator;
use crate::types::errors::SyncError;
use crate::{PLUGINS_DIR, THEMES_DIR};

/// What kind of deployment target a project maps to. Determines the
/// subdirectory of the content root the files land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Theme,
    Plugin,
}

impl ProjectKind {
    /// Parse the wire form used by control surfaces ("theme" / "plugin").
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "theme" => Some(ProjectKind::Theme),
            "plugin" => Some(ProjectKind::Plugin),
            _ => None,
        }
    }

    pub fn subdir(&self) -> &'static str {
        match self {
            ProjectKind::Theme => THEMES_DIR,
            ProjectKind::Plugin => PLUGINS_DIR,
        }
    }
}

/// Snapshot of one upstream commit as reported by the GitHub API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One entry in a project's deployment history: which commit was put
/// into the target directory, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub sha: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub commit_timestamp: Option<DateTime<Utc>>,
    pub deployed_at: DateTime<Utc>,
}

/// A tracked mapping between a remote repository and a local
/// deployment directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque unique id, generated at creation, never reused.
    pub id: String,
    /// Canonical repository URL (`https://github.com/{owner}/{repo}`).
    pub locator: String,
    pub kind: ProjectKind,
    /// Directory name under the deployment root.
    pub local_name: String,
    /// Default ref for "sync to latest".
    pub branch: String,
    /// Most recently observed upstream tip. Refreshed on demand,
    /// independent of what is actually deployed.
    #[serde(default)]
    pub last_known_commit: Option<CommitInfo>,
    /// Sha of the commit actually present in the target directory.
    #[serde(default)]
    pub deployed_commit: Option<String>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Deployment records, newest first, capped to
    /// [`crate::DEPLOY_HISTORY_LIMIT`].
    #[serde(default)]
    pub history: Vec<DeploymentRecord>,
}

impl Project {
    pub fn new(locator: &RepoLocator, kind: ProjectKind, local_name: &str, branch: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            locator: locator.canonical_url(),
            kind,
            local_name: local_name.to_string(),
            branch: branch.to_string(),
            last_known_commit: None,
            deployed_commit: None,
            last_sync: None,
            created_at: Utc::now(),
            history: Vec::new(),
        }
    }

    /// Resolve the deployment directory under `content_dir`.
    ///
    /// A pure function of (kind, local name). The local name is
    /// re-checked here so a hand-edited store file can never point a
    /// sync outside the content root.
    pub fn target_dir(&self, content_dir: &Path) -> Result<PathBuf, SyncError> {
        if !is_safe_dir_name(&self.local_name) {
            return Err(SyncError::InvalidProjectType {
                name: self.local_name.clone(),
            });
        }
        Ok(content_dir.join(self.kind.subdir()).join(&self.local_name))
    }
}

/// Structured outcome of one sync/restore invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub success: bool,
    /// Human-readable summary of what happened.
    pub message: String,
    /// Machine-checkable reason tag; `None` on success.
    pub reason: Option<String>,
    pub target_dir: Option<String>,
    /// Resolved commit sha this outcome refers to.
    pub sha: Option<String>,
    /// Where the previous tree was renamed aside, if one existed.
    pub backup: Option<String>,
}

impl SyncOutcome {
    pub fn failure(error: &SyncError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            reason: Some(error.reason().to_string()),
            target_dir: None,
            sha: None,
            backup: None,
        }
    }
}
