pub mod archive;
pub mod config;
pub mod deploy;
pub mod fs_utils;
pub mod github;
pub mod locator;
pub mod store;
pub mod sync;
