use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Args;
use serde::{Serialize, Deserialize, Deserializer};
use url::Url;

use crate::error::DropError;
use crate::fs::get_metadata;
use crate::path;

pub const SETTINGS_NAME: &str = "dbdrop.json";

pub const DEFAULT_DATABASE: &str = "default";

const POSTGRES_ENGINES: [&str; 5] = [
    "django.db.backends.postgresql",
    "django.db.backends.postgresql_psycopg2",
    "django.contrib.gis.db.backends.postgis",
    "postgresql",
    "postgres",
];

const SQLITE_ENGINES: [&str; 3] = [
    "django.db.backends.sqlite3",
    "sqlite3",
    "sqlite",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Postgres,
    Sqlite,
}

impl Display for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Engine::Postgres => f.write_str("PostgreSQL"),
            Engine::Sqlite => f.write_str("SQLite"),
        }
    }
}

impl FromStr for Engine {
    type Err = DropError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if POSTGRES_ENGINES.contains(&value) {
            Ok(Engine::Postgres)
        } else if SQLITE_ENGINES.contains(&value) {
            Ok(Engine::Sqlite)
        } else {
            Err(DropError::UnsupportedEngine(value.to_owned()))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub engine: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// a number, a numeric string, or `""` for unset
    #[serde(
        default,
        deserialize_with = "deserialize_port",
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// database name, or the file path for sqlite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// connection url for postgres. discrete fields take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Port::Number(port)) => Ok(Some(port)),
        Some(Port::Text(text)) => {
            let text = text.trim();

            if text.is_empty() {
                Ok(None)
            } else {
                text.parse()
                    .map(Some)
                    .map_err(|_| serde::de::Error::custom(format!("invalid port \"{}\"", text)))
            }
        }
    }
}

impl DatabaseSettings {
    pub fn engine(&self) -> Result<Engine, DropError> {
        self.engine.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationMode {
    /// only remove migrations when asked to on the command line
    #[default]
    Flag,

    /// always remove migrations after dropping the database
    Always,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropSettings {
    pub recreate_schema: bool,
    pub migrations: MigrationMode,
    pub keep_pycache: bool,
}

impl Default for DropSettings {
    fn default() -> Self {
        DropSettings {
            recreate_schema: true,
            migrations: MigrationMode::default(),
            keep_pycache: true,
        }
    }
}

fn default_app_paths() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub databases: BTreeMap<String, DatabaseSettings>,

    #[serde(default)]
    pub installed_apps: Vec<String>,

    #[serde(default = "default_app_paths")]
    pub app_paths: Vec<PathBuf>,

    #[serde(default)]
    pub drop: DropSettings,
}

/// options shared by every command for finding the settings to act on
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// settings file to use instead of searching upwards from the current
    /// directory
    #[arg(long, global = true, env = "DBDROP_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// the database alias to act on
    #[arg(short, long, global = true, default_value = DEFAULT_DATABASE)]
    pub database: String,
}

impl ProjectArgs {
    pub fn load(&self) -> anyhow::Result<Project> {
        Project::locate(self.settings.as_deref(), path::get_cwd()?)
    }
}

/// loaded settings along with the directory they were found in
#[derive(Debug)]
pub struct Project {
    root: Box<Path>,
    path: Box<Path>,
    pub settings: Settings,
}

impl Project {
    #[cfg(test)]
    pub fn new<P>(root: P, settings: Settings) -> Self
    where
        P: Into<Box<Path>>,
    {
        let root = root.into();

        Project {
            path: root.join(SETTINGS_NAME).into(),
            root,
            settings,
        }
    }

    /// walks up from `ref_path` looking for a settings file
    pub fn find_file(ref_path: &Path) -> anyhow::Result<Option<PathBuf>> {
        for ancestor in ref_path.ancestors() {
            let settings_file = ancestor.join(SETTINGS_NAME);

            let Some(metadata) = get_metadata(&settings_file)
                .context("io error when checking for settings file")? else {
                continue;
            };

            if !metadata.is_file() {
                continue;
            }

            return Ok(Some(settings_file));
        }

        Ok(None)
    }

    pub fn load<P>(path: P) -> anyhow::Result<Self>
    where
        P: Into<Box<Path>>
    {
        let path = path.into();

        let file = std::fs::OpenOptions::new()
            .read(true)
            .open(&path)
            .with_context(|| format!("failed reading settings: {}", path.display()))?;
        let reader = BufReader::new(file);

        let settings = serde_json::from_reader(reader)
            .with_context(|| format!("failed deserializing settings json: {}", path.display()))?;

        let root = path.parent()
            .context("settings file directory missing from path")?
            .into();

        Ok(Project {
            root,
            path,
            settings,
        })
    }

    /// loads the explicitly given settings file or searches upwards from `cwd`
    pub fn locate(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<Self> {
        if let Some(given) = explicit {
            let resolved = path::resolve(cwd, given)?;

            log::info!("using settings file: {}", resolved.display());

            return Self::load(resolved);
        }

        let Some(found) = Self::find_file(cwd)? else {
            return Err(DropError::SettingsNotFound(cwd.to_path_buf()).into());
        };

        log::info!("settings file found: {}", found.display());

        Self::load(found)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self, alias: &str) -> Result<&DatabaseSettings, DropError> {
        self.settings.databases.get(alias)
            .ok_or_else(|| DropError::MissingDatabase(alias.to_owned()))
    }
}
