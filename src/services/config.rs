//! Runtime configuration loaded from the environment.

use std::env;
use std::path::PathBuf;

/// Environment variable holding an optional GitHub access token.
/// Absence is fine; public repositories stay fetchable without it.
pub const TOKEN_VAR: &str = "GITPRESS_GITHUB_TOKEN";
/// Environment variable overriding the content root (the directory
/// that contains `themes/` and `plugins/`).
pub const CONTENT_DIR_VAR: &str = "GITPRESS_CONTENT_DIR";
/// Environment variable overriding the project collection file path.
pub const STORE_PATH_VAR: &str = "GITPRESS_STORE_PATH";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub content_dir: PathBuf,
    pub store_path: PathBuf,
    pub github_token: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Self {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();

        let content_dir = env::var(CONTENT_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("wp-content"));

        let store_path = env::var(STORE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| content_dir.join("gitpress-projects.json"));

        let github_token = env::var(TOKEN_VAR).ok().filter(|t| !t.trim().is_empty());

        Self {
            content_dir,
            store_path,
            github_token,
        }
    }
}
