//! Closed error taxonomy for the sync engine.
//!
//! Every service returns its own error enum; `CommandError` is the
//! boundary type handed to whatever control surface (CLI, HTTP, UI)
//! drives the commands, and serializes to a short reason string.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// A repository URL that could not be reduced to `owner/repo`.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("not a GitHub repository URL: {0}")]
    Invalid(String),
}

/// Errors from GitHub metadata queries (commits, branches, history).
#[derive(Debug, Error)]
pub enum GithubError {
    /// Transport-level failure (DNS, TLS, connect, timeout). Transient.
    #[error("GitHub request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("GitHub API returned HTTP {status}")]
    Status { status: u16 },

    /// The response body did not match the expected payload shape.
    #[error("failed to decode GitHub response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The HTTP client itself could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl GithubError {
    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GithubError::Network(_) => true,
            GithubError::Status { status } => *status == 429 || *status >= 500,
            GithubError::Decode(_) | GithubError::Client(_) => false,
        }
    }
}

/// Errors while downloading a repository archive to a temp file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure mid-download. Transient.
    #[error("archive download failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The archive endpoint answered with a non-success status.
    #[error("archive download returned HTTP {status}")]
    Status { status: u16 },

    /// Writing the downloaded bytes to the scoped temp file failed.
    #[error("failed to write archive to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Status { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors while unpacking an archive into a workspace.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Corrupt or unreadable archive.
    #[error("invalid or corrupt ZIP archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The unpacked workspace contained no directory entry at all.
    #[error("no top-level directory found in extracted archive")]
    NoTopLevelDirectory,

    /// The unpacked workspace contained more than one top-level directory.
    #[error("ambiguous archive layout: {found} top-level directories")]
    AmbiguousLayout { found: usize },
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while replacing a target directory with a new tree.
#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("source directory does not exist: {0}")]
    MissingSource(PathBuf),

    /// Renaming the live target aside failed; nothing was modified.
    #[error("failed to back up existing directory to {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file or directory could not be written into the target.
    /// `restored` reports whether the pre-sync backup was renamed back.
    #[error("failed to copy {path} (backup restored: {restored}): {source}")]
    Copy {
        path: PathBuf,
        restored: bool,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the persisted project collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project not found: {id}")]
    NotFound { id: String },

    /// Another project already deploys into the same target directory.
    #[error("target directory already in use: {path}")]
    DuplicateTarget { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project collection JSON error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Top-level error for a sync/restore invocation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another sync for the same project is still in flight.
    #[error("a sync is already in progress for this project")]
    SyncInProgress,

    /// The project's kind + local name do not resolve to a usable
    /// target directory. Unreachable for inputs that passed command
    /// validation, checked defensively anyway.
    #[error("cannot resolve target directory for local name {name:?}")]
    InvalidProjectType { name: String },

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Replace(#[from] ReplaceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The scratch workspace for extraction could not be created.
    #[error("failed to create workspace: {0}")]
    Workspace(#[source] std::io::Error),
}

impl SyncError {
    /// Short machine-checkable reason tag for operator-facing results.
    pub fn reason(&self) -> &'static str {
        match self {
            SyncError::SyncInProgress => "sync_in_progress",
            SyncError::InvalidProjectType { .. } => "invalid_project_type",
            SyncError::Locator(_) => "invalid_locator",
            SyncError::Github(_) => "github_api",
            SyncError::Fetch(_) => "fetch_failed",
            SyncError::Extract(_) => "extract_failed",
            SyncError::Replace(_) => "replace_failed",
            SyncError::Store(_) => "store_failed",
            SyncError::Workspace(_) => "workspace_io",
        }
    }
}

/// Boundary error returned by the command layer.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("GitHub error: {0}")]
    Github(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => CommandError::NotFound(id),
            StoreError::DuplicateTarget { path } => CommandError::Validation(format!(
                "target directory already in use: {}",
                path.display()
            )),
            other => CommandError::Store(other.to_string()),
        }
    }
}

impl From<GithubError> for CommandError {
    fn from(error: GithubError) -> Self {
        CommandError::Github(error.to_string())
    }
}

impl From<LocatorError> for CommandError {
    fn from(error: LocatorError) -> Self {
        CommandError::Validation(error.to_string())
    }
}

impl Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
