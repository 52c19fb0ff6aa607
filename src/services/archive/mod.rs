pub mod extract;

pub use extract::{extract_archive, locate_source_root};
