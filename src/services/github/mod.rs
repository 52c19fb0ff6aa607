//! GitHub REST collaborators: metadata queries and archive downloads.

pub mod archive_fetch;
pub mod client;

pub use archive_fetch::{download_archive, ArchiveRef};
pub use client::GithubClient;
