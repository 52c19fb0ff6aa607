use std::path::{Component, Path};

/// Whether `name` is usable as a single directory name directly under a
/// deployment root. Rejects empty names, separators, traversal
/// components, and anything the filesystem sanitizer would rewrite.
pub fn is_safe_dir_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return false,
    }

    sanitize_filename::sanitize(name) == name
}
