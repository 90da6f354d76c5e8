use std::fs::Metadata;
use std::path::Path;
use std::io::ErrorKind;

use anyhow::Context;

/// metadata for the given path without following a trailing symlink.
/// a missing entry is `None` instead of an error
pub fn get_metadata(path: &Path) -> Result<Option<Metadata>, std::io::Error> {
    match path.symlink_metadata() {
        Ok(m) => Ok(Some(m)),
        Err(err) => match err.kind() {
            ErrorKind::NotFound => Ok(None),
            _ => Err(err),
        }
    }
}

/// follows symlinks, a link to a directory counts as one
pub fn is_dir(path: &Path) -> anyhow::Result<bool> {
    match path.metadata() {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(err) => match err.kind() {
            ErrorKind::NotFound => Ok(false),
            _ => Err(anyhow::Error::new(err)
                .context(format!("failed to get metadata for {}", path.display()))),
        }
    }
}

/// removes a directory recursively or a single file/symlink
pub fn remove_entry(path: &Path) -> anyhow::Result<()> {
    let metadata = path.symlink_metadata()
        .with_context(|| format!("failed to get metadata for {}", path.display()))?;

    if metadata.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory {}", path.display()))
    } else {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove file {}", path.display()))
    }
}
