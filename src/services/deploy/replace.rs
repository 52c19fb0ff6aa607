//! Full-replace deployment of an extracted source tree.
//!
//! Replace, not merge: the live target directory is renamed aside as a
//! timestamped backup, the new tree is copied in, and the backup is
//! renamed back only if the copy fails. Local edits in the target are
//! never preserved across a sync.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::services::fs_utils::file_utils::{remove_dir_recursive, rename_or_move};
use crate::types::errors::ReplaceError;

const BACKUP_INFIX: &str = "-backup-";
const BACKUP_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// What a successful replace did.
#[derive(Debug, Clone)]
pub struct ReplaceReport {
    pub target: PathBuf,
    pub files_copied: usize,
    /// Where the previous tree went, if one existed. Retained after a
    /// successful replace so the operator can prune or roll back.
    pub backup: Option<PathBuf>,
}

/// A retained backup of a previously deployed tree.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Replace the entire contents of `target` with the tree under `source`.
///
/// If any file fails to copy, the partially written target is deleted
/// and the backup renamed back into place before the error is returned.
pub fn replace_directory(source: &Path, target: &Path) -> Result<ReplaceReport, ReplaceError> {
    if !source.is_dir() {
        return Err(ReplaceError::MissingSource(source.to_path_buf()));
    }

    let backup = if target.exists() {
        let backup_path = backup_sibling(target);
        rename_or_move(target, &backup_path).map_err(|e| ReplaceError::Backup {
            path: backup_path.clone(),
            source: e,
        })?;
        log::info!(
            "Existing tree moved aside: {} -> {}",
            target.display(),
            backup_path.display()
        );
        Some(backup_path)
    } else {
        None
    };

    match copy_tree(source, target) {
        Ok(files_copied) => Ok(ReplaceReport {
            target: target.to_path_buf(),
            files_copied,
            backup,
        }),
        Err((failed_path, source_err)) => {
            let restored = roll_back(target, backup.as_deref());
            Err(ReplaceError::Copy {
                path: failed_path,
                restored,
                source: source_err,
            })
        }
    }
}

fn backup_sibling(target: &Path) -> PathBuf {
    let stamp = Utc::now().format(BACKUP_STAMP_FORMAT);
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "target".to_string());

    let candidate = target.with_file_name(format!("{name}{BACKUP_INFIX}{stamp}"));
    if !candidate.exists() {
        return candidate;
    }
    // Two deployments inside the same second; disambiguate.
    let mut counter = 2;
    loop {
        let next = target.with_file_name(format!("{name}{BACKUP_INFIX}{stamp}-{counter}"));
        if !next.exists() {
            return next;
        }
        counter += 1;
    }
}

/// Copy `source` into `target`, parents before children. Directory
/// creation is idempotent; file copies are byte-for-byte.
fn copy_tree(source: &Path, target: &Path) -> Result<usize, (PathBuf, std::io::Error)> {
    fs::create_dir_all(target).map_err(|e| (target.to_path_buf(), e))?;

    let mut files_copied = 0;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source.to_path_buf());
            (path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| (entry.path().to_path_buf(), std::io::Error::other(e)))?;
        let dest = target.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| (dest.clone(), e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| (dest.clone(), e))?;
            files_copied += 1;
        }
    }
    Ok(files_copied)
}

/// Delete the partial target and put the backup back. Returns whether
/// the backup was actually restored.
fn roll_back(target: &Path, backup: Option<&Path>) -> bool {
    if let Err(e) = remove_dir_recursive(target) {
        log::error!("Could not remove partial target {}: {e}", target.display());
        return false;
    }
    let Some(backup) = backup else {
        return false;
    };
    match rename_or_move(backup, target) {
        Ok(()) => {
            log::info!("Restored backup {} -> {}", backup.display(), target.display());
            true
        }
        Err(e) => {
            log::error!("Failed to restore backup {}: {e}", backup.display());
            false
        }
    }
}

/// Enumerate retained backups of `target`, newest first.
pub fn list_backups(target: &Path) -> Vec<BackupInfo> {
    let Some(parent) = target.parent() else {
        return Vec::new();
    };
    let Some(name) = target.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Vec::new();
    };
    let prefix = format!("{name}{BACKUP_INFIX}");

    let Ok(entries) = fs::read_dir(parent) else {
        return Vec::new();
    };

    let mut backups: Vec<BackupInfo> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let entry_name = entry.file_name().to_string_lossy().into_owned();
            let stamp = entry_name.strip_prefix(&prefix)?.to_string();
            Some(BackupInfo {
                path: entry.path(),
                name: entry_name,
                created_at: parse_backup_stamp(&stamp),
            })
        })
        .collect();

    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    backups
}

fn parse_backup_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, BACKUP_STAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
