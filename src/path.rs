use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use path_absolutize::Absolutize as _;
use thiserror::Error;

static CWD: OnceLock<Box<Path>> = OnceLock::new();

pub fn set_cwd() -> anyhow::Result<()> {
    let result = std::env::current_dir().context("failed to retrieve current working directory")?;

    let _ = CWD.set(result.into());

    Ok(())
}

pub fn get_cwd() -> anyhow::Result<&'static Path> {
    CWD.get()
        .map(|cwd| &**cwd)
        .context("current working directory was not recorded")
}

#[derive(Debug, Error)]
pub enum PathError {
    #[error("io error when resolving path {}", .1.display())]
    Io(#[source] std::io::Error, PathBuf),
}

/// makes `given` absolute using `root` as the base for relative paths. `.`
/// and `..` segments are collapsed without touching the file system
pub fn resolve(root: &Path, given: &Path) -> Result<PathBuf, PathError> {
    if given.is_absolute() {
        return match given.absolutize() {
            Ok(v) => Ok(v.into()),
            Err(err) => Err(PathError::Io(err, given.to_path_buf())),
        };
    }

    match given.absolutize_from(root) {
        Ok(v) => Ok(v.into()),
        Err(err) => Err(PathError::Io(err, given.to_path_buf())),
    }
}

/// converts a dotted app identifier into a relative directory path.
///
/// `shop.orders` becomes `shop/orders`. empty segments (leading, trailing or
/// doubled dots) are rejected
pub fn app_dir(app: &str) -> Option<PathBuf> {
    let mut rtn = PathBuf::new();

    for segment in app.split('.') {
        if segment.is_empty() {
            return None;
        }

        rtn.push(segment);
    }

    Some(rtn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_root() {
        let root = Path::new("/srv/project");

        assert_eq!(
            resolve(root, Path::new("db.sqlite3")).unwrap(),
            PathBuf::from("/srv/project/db.sqlite3")
        );
        assert_eq!(
            resolve(root, Path::new("../shared/./db.sqlite3")).unwrap(),
            PathBuf::from("/srv/shared/db.sqlite3")
        );
        assert_eq!(
            resolve(root, Path::new("/var/db.sqlite3")).unwrap(),
            PathBuf::from("/var/db.sqlite3")
        );
    }

    #[test]
    fn dotted_apps_become_paths() {
        assert_eq!(app_dir("blog"), Some(PathBuf::from("blog")));
        assert_eq!(app_dir("shop.orders"), Some(Path::new("shop").join("orders")));
        assert_eq!(app_dir(""), None);
        assert_eq!(app_dir("shop..orders"), None);
        assert_eq!(app_dir(".blog"), None);
    }
}
