//! Downloads a repository snapshot archive to a scoped temp file.
//!
//! The returned [`NamedTempFile`] deletes itself on drop, so the
//! downloaded archive is cleaned up on every exit path of the caller.

use futures_util::StreamExt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::services::github::client::GithubClient;
use crate::services::locator::RepoLocator;
use crate::types::errors::FetchError;

/// A ref selecting the snapshot to download. GitHub exposes different
/// archive paths for branch tips and exact commits; callers never need
/// to know which is which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveRef {
    Branch(String),
    Commit(String),
}

impl ArchiveRef {
    /// The name or sha this ref points at.
    pub fn describe(&self) -> &str {
        match self {
            ArchiveRef::Branch(branch) => branch,
            ArchiveRef::Commit(sha) => sha,
        }
    }

    pub(super) fn archive_url(&self, web_base: &str, locator: &RepoLocator) -> String {
        match self {
            ArchiveRef::Branch(branch) => format!(
                "{web_base}/{}/archive/refs/heads/{}.zip",
                locator.slug(),
                encode_ref(branch)
            ),
            ArchiveRef::Commit(sha) => {
                format!("{web_base}/{}/archive/{}.zip", locator.slug(), sha)
            }
        }
    }
}

/// Percent-encode a branch name segment by segment. Branches like
/// `feature/foo` keep their slashes; everything else is escaped.
fn encode_ref(branch: &str) -> String {
    branch
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Download the archive for `target` into a fresh temp file under
/// `scratch_dir`. Any failure deletes the partial download.
pub async fn download_archive(
    client: &GithubClient,
    locator: &RepoLocator,
    target: &ArchiveRef,
    scratch_dir: &Path,
) -> Result<NamedTempFile, FetchError> {
    let url = target.archive_url(&client.web_base, locator);
    log::info!("Downloading archive: {url}");

    let mut file = tempfile::Builder::new()
        .prefix("gitpress-archive-")
        .suffix(".zip")
        .tempfile_in(scratch_dir)
        .map_err(|e| FetchError::Io {
            path: scratch_dir.to_path_buf(),
            source: e,
        })?;
    let file_path = file.path().to_path_buf();

    let response = client
        .authorize(client.download.get(&url))
        .send()
        .await
        .map_err(FetchError::Network)?;

    let status = response.status();
    if !status.is_success() {
        log::warn!("Archive fetch failed for {locator}: HTTP {status}");
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        file.write_all(&chunk).map_err(|e| FetchError::Io {
            path: file_path.clone(),
            source: e,
        })?;
    }
    file.flush().map_err(|e| FetchError::Io {
        path: file_path.clone(),
        source: e,
    })?;

    log::info!(
        "Archive for {locator}@{} downloaded to {}",
        target.describe(),
        file_path.display()
    );
    Ok(file)
}
