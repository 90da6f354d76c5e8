use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::error::DropError;
use crate::fs;
use crate::output::Console;
use crate::path;
use crate::settings::{Project, ProjectArgs};

pub const MIGRATIONS_DIR: &str = "migrations";

const INIT_FILE: &str = "__init__.py";
const PYCACHE_DIR: &str = "__pycache__";

#[derive(Debug, Args)]
pub struct MigrationsArgs {}

/// decides which entries of a migrations directory survive the cleanup
#[derive(Debug, Clone, Copy)]
pub struct Exclusions {
    keep_pycache: bool,
}

impl Exclusions {
    pub fn new(keep_pycache: bool) -> Self {
        Exclusions { keep_pycache }
    }

    pub fn is_excluded(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();

        // hidden entries never matched the `migrations/*` glob
        if name.starts_with('.') || name.contains(INIT_FILE) {
            return true;
        }

        self.keep_pycache && name == PYCACHE_DIR
    }
}

/// finds the directory of every installed app. fails on the first app that
/// cannot be found in any of the configured app paths
pub fn locate_apps(project: &Project) -> anyhow::Result<Vec<PathBuf>> {
    let mut search = Vec::with_capacity(project.settings.app_paths.len());

    for app_path in &project.settings.app_paths {
        search.push(path::resolve(project.root(), app_path)?);
    }

    let mut rtn = Vec::with_capacity(project.settings.installed_apps.len());

    for app in &project.settings.installed_apps {
        let Some(relative) = path::app_dir(app) else {
            return Err(DropError::AppNotFound(app.clone()).into());
        };

        let mut found = None;

        for root in &search {
            let candidate = root.join(&relative);

            log::debug!("looking for app {} in {}", app, candidate.display());

            if fs::is_dir(&candidate)? {
                found = Some(candidate);
                break;
            }
        }

        let Some(app_dir) = found else {
            return Err(DropError::AppNotFound(app.clone()).into());
        };

        log::info!("app {} located at {}", app, app_dir.display());

        rtn.push(app_dir);
    }

    Ok(rtn)
}

/// lists the entries of a migrations directory that would be removed, sorted
/// by name. a missing directory has nothing to remove
pub fn candidates(dir: &std::path::Path, exclusions: Exclusions) -> anyhow::Result<Vec<PathBuf>> {
    if !fs::is_dir(dir)? {
        log::debug!("no migrations directory: {}", dir.display());

        return Ok(Vec::new());
    }

    let read_dir = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut rtn = Vec::new();

    for entry in read_dir {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", dir.display()))?;

        if exclusions.is_excluded(&entry.file_name()) {
            log::debug!("keeping {}", entry.path().display());
            continue;
        }

        rtn.push(entry.path());
    }

    rtn.sort();

    Ok(rtn)
}

/// removes the generated migration files of every installed app and returns
/// how many entries were deleted
pub fn remove<W>(console: &mut Console<W>, project: &Project) -> anyhow::Result<usize>
where
    W: Write,
{
    let exclusions = Exclusions::new(project.settings.drop.keep_pycache);
    let apps = locate_apps(project)?;

    let mut deleted = 0;

    for app_dir in apps {
        for entry in candidates(&app_dir.join(MIGRATIONS_DIR), exclusions)? {
            console.step(&format!("Removing {}...", entry.display()))?;

            fs::remove_entry(&entry)?;
            deleted += 1;

            console.ok()?;
        }
    }

    if deleted == 0 {
        console.info("No migrations to delete")?;
    }

    Ok(deleted)
}

pub fn remove_migrations(_args: MigrationsArgs, project_args: &ProjectArgs) -> anyhow::Result<()> {
    let project = project_args.load()?;
    let mut console = Console::stdout();

    console.heading("Removing migrations:")?;

    remove(&mut console, &project)?;

    Ok(())
}
