//! Unpacks a downloaded repository archive into a scoped workspace.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::errors::ExtractError;

/// Unpack `archive_path` fully into `workspace` and return the single
/// top-level source directory GitHub's archiver produces
/// (`{repo}-{ref}`; the name is discovered, never assumed).
///
/// The workspace must be exclusively owned by this operation. Cleanup
/// of the workspace is the caller's job regardless of outcome.
pub fn extract_archive(archive_path: &Path, workspace: &Path) -> Result<PathBuf, ExtractError> {
    let file =
        fs::File::open(archive_path).map_err(|e| ExtractError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        // Entries that would escape the workspace are skipped outright.
        let Some(rel_path) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let out_path = workspace.join(rel_path);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| ExtractError::io(&out_path, e))?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| ExtractError::io(parent, e))?;
            }
            let mut out_file =
                fs::File::create(&out_path).map_err(|e| ExtractError::io(&out_path, e))?;
            io::copy(&mut entry, &mut out_file).map_err(|e| ExtractError::io(&out_path, e))?;
        }
    }

    locate_source_root(workspace)
}

/// Find the single top-level directory inside `workspace`.
///
/// GitHub archives always wrap the tree in exactly one directory; zero
/// or multiple directory entries mean the archive did not match the
/// expected shape.
pub fn locate_source_root(workspace: &Path) -> Result<PathBuf, ExtractError> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    let entries = fs::read_dir(workspace).map_err(|e| ExtractError::io(workspace, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ExtractError::io(workspace, e))?;
        let file_type = entry.file_type().map_err(|e| ExtractError::io(entry.path(), e))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }

    if dirs.is_empty() {
        return Err(ExtractError::NoTopLevelDirectory);
    }
    if dirs.len() > 1 {
        return Err(ExtractError::AmbiguousLayout { found: dirs.len() });
    }
    Ok(dirs.remove(0))
}
