//! Metadata queries against the GitHub REST API.
//!
//! Short-deadline requests only (commit lookups, branch lists, commit
//! history). Archive downloads live in [`super::archive_fetch`] and use
//! their own, much longer deadline.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::services::locator::RepoLocator;
use crate::types::errors::GithubError;
use crate::types::project::CommitInfo;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_WEB_BASE: &str = "https://github.com";

/// Deadline for metadata queries.
const API_TIMEOUT: Duration = Duration::from_secs(15);
/// Deadline for archive downloads. Generous so large repositories can
/// finish transferring.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

const USER_AGENT: &str = concat!("gitpress/", env!("CARGO_PKG_VERSION"));
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";

pub struct GithubClient {
    api: Client,
    pub(super) download: Client,
    api_base: String,
    pub(super) web_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, GithubError> {
        Self::with_base_urls(DEFAULT_API_BASE, DEFAULT_WEB_BASE, token)
    }

    /// Point the client at alternate API / archive hosts. Used by tests
    /// and GitHub Enterprise style mirrors.
    pub fn with_base_urls(
        api_base: impl Into<String>,
        web_base: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, GithubError> {
        let api = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(GithubError::Client)?;
        let download = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(GithubError::Client)?;

        Ok(Self {
            api,
            download,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            web_base: web_base.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Attach the standard headers plus the bearer token, if one is
    /// configured. No token is not an error; public repositories stay
    /// reachable.
    pub(super) fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header(reqwest::header::USER_AGENT, USER_AGENT);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, GithubError> {
        let req = self.authorize(self.api.get(&url).header(reqwest::header::ACCEPT, ACCEPT_JSON));
        let response = req.send().await.map_err(GithubError::Network)?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("GitHub API {url} answered HTTP {status}");
            return Err(GithubError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(GithubError::Decode)
    }

    /// Resolve a ref (branch name or commit sha) to its commit.
    pub async fn latest_commit(
        &self,
        locator: &RepoLocator,
        reference: &str,
    ) -> Result<CommitInfo, GithubError> {
        let url = format!(
            "{}/repos/{}/commits/{}",
            self.api_base,
            locator.slug(),
            reference
        );
        let payload: CommitPayload = self.get_json(url).await?;
        Ok(payload.into_commit_info())
    }

    /// All branch names of the repository.
    pub async fn branches(&self, locator: &RepoLocator) -> Result<Vec<String>, GithubError> {
        let url = format!("{}/repos/{}/branches", self.api_base, locator.slug());
        let payload: Vec<BranchPayload> = self.get_json(url).await?;
        Ok(payload.into_iter().map(|b| b.name).collect())
    }

    /// The most recent commits reachable from `reference`, newest first.
    pub async fn commit_history(
        &self,
        locator: &RepoLocator,
        reference: &str,
        per_page: u32,
    ) -> Result<Vec<CommitInfo>, GithubError> {
        let url = format!(
            "{}/repos/{}/commits?sha={}&per_page={}",
            self.api_base,
            locator.slug(),
            urlencoding::encode(reference),
            per_page
        );
        let payload: Vec<CommitPayload> = self.get_json(url).await?;
        Ok(payload
            .into_iter()
            .map(CommitPayload::into_commit_info)
            .collect())
    }
}

// ── GitHub REST payload shapes ──

#[derive(Debug, Deserialize)]
struct CommitPayload {
    sha: String,
    #[serde(default)]
    commit: CommitDetail,
}

#[derive(Debug, Default, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: Option<Signature>,
    #[serde(default)]
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct BranchPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Signature {
    #[serde(default)]
    name: String,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl CommitPayload {
    fn into_commit_info(self) -> CommitInfo {
        CommitInfo {
            sha: self.sha,
            message: self.commit.message,
            author: self.commit.author.map(|a| a.name).unwrap_or_default(),
            // GitHub's committer date is when the snapshot actually landed.
            timestamp: self.commit.committer.and_then(|c| c.date),
        }
    }
}
