//! The operations exposed to a control surface (CLI, HTTP API, UI).
//!
//! Thin async wrappers over the services; permission checks belong to
//! the surface itself, not here.

pub mod history_cmds;
pub mod project_cmds;
pub mod sync_cmds;

pub use history_cmds::{get_commit_history, list_project_backups, ProjectHistory};
pub use project_cmds::{add_project, delete_project, list_projects, NewProject};
pub use sync_cmds::{check_for_update, list_branches, restore_to_commit, sync_now, UpdateCheck};
