//! Repository locator parsing and normalization.
//!
//! A locator is the canonical identity of a GitHub repository
//! (owner + name). `https://github.com/acme/widget`,
//! `https://github.com/acme/widget/` and
//! `https://github.com/acme/widget.git` all normalize to the same value.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::errors::LocatorError;

fn locator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Owner and repo use GitHub's allowed charset; anything past
        // `owner/repo` (tree paths, query strings) is rejected.
        Regex::new(r"^https?://(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$")
            .expect("locator regex is valid")
    })
}

/// Canonical identifier of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    owner: String,
    repo: String,
}

impl RepoLocator {
    /// Parse and normalize a user-supplied repository URL.
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let trimmed = input.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let captures = locator_re()
            .captures(trimmed)
            .ok_or_else(|| LocatorError::Invalid(input.to_string()))?;

        let owner = captures[1].to_string();
        let repo = captures[2].to_string();
        if owner == "." || owner == ".." || repo == "." || repo == ".." {
            return Err(LocatorError::Invalid(input.to_string()));
        }

        Ok(Self { owner, repo })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Canonical form stored on projects: scheme + host + owner + name,
    /// no trailing slash, no `.git`.
    pub fn canonical_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    /// REST path segment `{owner}/{repo}`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}
