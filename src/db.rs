use std::io::Write;

use crate::output::Console;
use crate::settings::{Engine, Project};

pub mod drop;
mod postgres;
mod sqlite;

/// erases all user data of the database registered under `alias`.
///
/// the engine is checked before anything is touched so an unsupported
/// backend fails without side effects
pub fn reset<W>(console: &mut Console<W>, project: &Project, alias: &str) -> anyhow::Result<()>
where
    W: Write,
{
    let database = project.database(alias)?;
    let engine = database.engine()?;

    log::info!("resetting {} database \"{}\"", engine, alias);

    match engine {
        Engine::Postgres => postgres::drop_schema(
            console,
            database,
            project.settings.drop.recreate_schema,
        ),
        Engine::Sqlite => sqlite::drop_file(console, project.root(), database),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::DropError;
    use crate::output;
    use crate::settings::Settings;

    fn project(root: &std::path::Path, engine: &str) -> Project {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "databases": {
                "default": {"engine": engine, "name": "db.sqlite3"}
            }
        })).unwrap();

        Project::new(root, settings)
    }

    #[test]
    fn unsupported_engine_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let project = project(dir.path(), "django.db.backends.mysql");
        let mut console = Console::new(Vec::new());

        let err = reset(&mut console, &project, "default").unwrap_err();

        assert_eq!(err.to_string(), "engine not supported (django.db.backends.mysql)");
        assert!(output::captured(console).is_empty());
    }

    #[test]
    fn sqlite_dispatch_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = project(dir.path(), "django.db.backends.sqlite3");
        let mut console = Console::new(Vec::new());

        std::fs::write(dir.path().join("db.sqlite3"), b"SQLite format 3\0").unwrap();

        reset(&mut console, &project, "default").unwrap();

        assert!(!dir.path().join("db.sqlite3").exists());
        assert!(output::captured(console).contains("Dropping SQLite..."));
    }

    #[test]
    fn unknown_alias() {
        let dir = tempfile::tempdir().unwrap();
        let project = project(dir.path(), "sqlite3");
        let mut console = Console::new(Vec::new());

        let err = reset(&mut console, &project, "replica").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DropError>(),
            Some(DropError::MissingDatabase(alias)) if alias == "replica"
        ));
    }
}
