use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::fs;
use crate::output::Console;
use crate::path;
use crate::settings::DatabaseSettings;

const NOT_FOUND: &str = "No SQLite file is found";

const MEMORY_NAMES: [&str; 2] = [":memory:", "file::memory:"];

const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

fn sidecar(db_file: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(db_file.as_os_str());
    name.push(suffix);

    name.into()
}

/// deletes the database file and any journal files left next to it. a
/// missing file is reported but is not an error
pub fn drop_file<W>(
    console: &mut Console<W>,
    root: &Path,
    database: &DatabaseSettings,
) -> anyhow::Result<()>
where
    W: Write,
{
    let name = database.name.as_deref().unwrap_or_default();

    if name.is_empty() || MEMORY_NAMES.iter().any(|mem| name.starts_with(mem)) {
        log::info!("sqlite database is not file backed: \"{}\"", name);

        return console.info(NOT_FOUND);
    }

    let db_file = path::resolve(root, Path::new(name))?;

    let Some(metadata) = fs::get_metadata(&db_file)
        .context("io error when checking for sqlite file")? else {
        log::info!("sqlite file not found: {}", db_file.display());

        return console.info(NOT_FOUND);
    };

    if !metadata.is_file() && !metadata.is_symlink() {
        return Err(anyhow::anyhow!(
            "sqlite path exists but is not a file: {}",
            db_file.display()
        ));
    }

    console.step("Dropping SQLite...")?;

    std::fs::remove_file(&db_file)
        .with_context(|| format!("failed to remove sqlite file: {}", db_file.display()))?;

    for suffix in SIDECAR_SUFFIXES {
        let path = sidecar(&db_file, suffix);

        let Some(metadata) = fs::get_metadata(&path)
            .context("io error when checking for sqlite journal")? else {
            continue;
        };

        if !metadata.is_file() {
            continue;
        }

        log::info!("removing sqlite journal: {}", path.display());

        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove sqlite journal: {}", path.display()))?;
    }

    console.ok()
}
