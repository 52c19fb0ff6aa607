pub mod replace;

pub use replace::{list_backups, replace_directory, BackupInfo, ReplaceReport};
