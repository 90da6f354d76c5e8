use std::io::Write;

use crate::db;
use crate::migrations;
use crate::output::Console;
use crate::settings::{MigrationMode, Project};

/// whether migration files are removed after the database is reset
pub fn cleanup_enabled(mode: MigrationMode, flag: bool) -> bool {
    match mode {
        MigrationMode::Always => true,
        MigrationMode::Flag => flag,
    }
}

/// drops the selected database and then, if enabled, removes the migration
/// files of every installed app. stops at the first failure
pub fn reset<W>(
    console: &mut Console<W>,
    project: &Project,
    alias: &str,
    migration_flag: bool,
) -> anyhow::Result<()>
where
    W: Write,
{
    console.heading("Dropping databases:")?;

    db::reset(console, project, alias)?;

    if !cleanup_enabled(project.settings.drop.migrations, migration_flag) {
        log::info!("migration files left in place, pass --migration to remove them");

        return Ok(());
    }

    console.heading("Removing migrations:")?;

    migrations::remove(console, project)?;

    Ok(())
}
