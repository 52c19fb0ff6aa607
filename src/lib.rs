pub mod commands;
pub mod services;
pub mod types;

/// Subdirectory of the content root that holds deployed themes.
pub const THEMES_DIR: &str = "themes";

/// Subdirectory of the content root that holds deployed plugins.
pub const PLUGINS_DIR: &str = "plugins";

/// Maximum number of deployment records kept per project. Newest first,
/// oldest evicted from the tail.
pub const DEPLOY_HISTORY_LIMIT: usize = 20;
