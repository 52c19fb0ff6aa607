use std::fs;
use std::io::Write;
use std::path::Path;

/// Rename a file or directory, falling back to a copy-and-delete move
/// when `fs::rename` fails (typically a cross-device link error, e.g.
/// a content dir and temp dir on different mounts).
pub fn rename_or_move(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::warn!(
                "fs::rename {} -> {} failed (cross-device?): {e}. Falling back to move.",
                from.display(),
                to.display()
            );

            if !from.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "source path does not exist",
                ));
            }

            if to.exists() {
                return Err(e); // Propagate the original error (e.g. AlreadyExists)
            }

            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }

            if from.is_dir() {
                let mut options = fs_extra::dir::CopyOptions::new();
                options.copy_inside = false;

                fs_extra::dir::move_dir(from, to, &options)
                    .map(|_| ())
                    .map_err(|err| std::io::Error::other(err.to_string()))
            } else {
                let mut options = fs_extra::file::CopyOptions::new();
                options.overwrite = false;

                fs_extra::file::move_file(from, to, &options)
                    .map(|_| ())
                    .map_err(|err| std::io::Error::other(err.to_string()))
            }
        }
    }
}

/// Recursively delete a directory. Missing paths are not an error.
pub fn remove_dir_recursive(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_dir_all(path)
}

/// Write bytes to `path` atomically: write a temp file in the same
/// directory, then rename it over the destination. Readers never see a
/// half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
