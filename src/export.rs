//! Offline exports.
//!
//! Both exports refuse to replace an existing destination unless `force` is
//! set, and never leave a half-written destination behind: content is
//! written to a temporary file (or directory) next to the destination and
//! moved into place once complete. An HTML export never replaces a directory
//! that holds the working directory.

use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Name of the page written into the HTML export directory.
pub const INDEX_FILE: &str = "index.html";

/// Writes `content` to `path`, atomically.
///
/// # Arguments
///
/// * `path` - Destination file
/// * `content` - Full file content
/// * `force` - Replace `path` when it already exists
///
/// # Errors
///
/// Returns [`Error::TargetExists`] when `path` exists and `force` is false;
/// the destination is not touched in that case.
pub fn write_new_file(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::TargetExists(path.to_path_buf()));
    }

    let parent = parent_dir(path);
    fs::create_dir_all(&parent)?;

    let mut file = NamedTempFile::new_in(&parent)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    if force {
        file.persist(path).map_err(|e| Error::IoError(e.error))?;
    } else {
        // The destination may have appeared since the check above
        file.persist_noclobber(path)
            .map_err(|e| match e.error.kind() {
                io::ErrorKind::AlreadyExists => Error::TargetExists(path.to_path_buf()),
                _ => Error::IoError(e.error),
            })?;
    }

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Writes the Markdown document to `path`.
pub fn export_markdown(path: &Path, markdown: &str, force: bool) -> Result<PathBuf> {
    write_new_file(path, markdown, force)?;
    info!("Markdown document written to {}", path.display());
    Ok(path.to_path_buf())
}

/// Writes a self-contained viewer page into directory `dir`.
///
/// The directory is assembled under a temporary name next to the resolved
/// destination and renamed into place. With `force`, an existing destination
/// is first moved aside and is put back if the new directory cannot take its
/// place.
///
/// Returns the path of the written page.
///
/// # Errors
///
/// * [`Error::TargetExists`] when `dir` exists and `force` is false
/// * [`Error::UnsafeTarget`] when `dir` is the filesystem root or contains
///   the working directory
pub fn export_html(dir: &Path, page: &str, force: bool) -> Result<PathBuf> {
    if dir.exists() && !force {
        return Err(Error::TargetExists(dir.to_path_buf()));
    }

    let target = resolve_target(dir)?;
    let parent = match target.parent() {
        Some(parent) => parent.to_path_buf(),
        None => return Err(Error::UnsafeTarget(dir.to_path_buf())),
    };
    let cwd = fs::canonicalize(std::env::current_dir()?)?;
    if cwd.starts_with(&target) {
        return Err(Error::UnsafeTarget(dir.to_path_buf()));
    }

    let staging = Builder::new().prefix(".routedoc-").tempdir_in(&parent)?;
    fs::write(staging.path().join(INDEX_FILE), page)?;

    let previous = if target.exists() {
        let backup = Builder::new().prefix(".routedoc-old-").tempdir_in(&parent)?;
        let moved = backup.path().join("previous");
        debug!("Moving existing {} aside", target.display());
        fs::rename(&target, &moved)?;
        Some((backup, moved))
    } else {
        None
    };

    let staged = staging.keep();
    if let Err(e) = fs::rename(&staged, &target) {
        let _ = fs::remove_dir_all(&staged);
        if let Some((backup, moved)) = previous {
            if let Err(restore) = fs::rename(&moved, &target) {
                let kept = backup.keep();
                warn!(
                    "Could not restore {} ({}); previous content kept in {}",
                    target.display(),
                    restore,
                    kept.display()
                );
            }
        }
        return Err(e.into());
    }

    let index = dir.join(INDEX_FILE);
    info!("HTML document written to {}", index.display());
    Ok(index)
}

/// Absolute, symlink-free form of `dir`; a missing destination is resolved
/// through its parent, which is created.
fn resolve_target(dir: &Path) -> Result<PathBuf> {
    if dir.exists() {
        return Ok(fs::canonicalize(dir)?);
    }
    let Some(name) = dir.file_name() else {
        return Err(Error::UnsafeTarget(dir.to_path_buf()));
    };
    let parent = parent_dir(dir);
    fs::create_dir_all(&parent)?;
    Ok(fs::canonicalize(parent)?.join(name))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
