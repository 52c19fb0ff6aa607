pub mod errors;
pub mod project;

pub use errors::{CommandError, CommandResult};
pub use project::{CommitInfo, DeploymentRecord, Project, ProjectKind, SyncOutcome};
