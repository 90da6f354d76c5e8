use std::io::Write;

use crate::error::DropError;
use crate::output::Console;
use crate::settings::DatabaseSettings;

const DRIVER: &str = "sqlx-postgres";

const DROP_SCHEMA: &str = "DROP SCHEMA IF EXISTS public CASCADE";
const CREATE_SCHEMA: &str = "CREATE SCHEMA public";

/// the statements run inside the reset transaction, in order
pub fn statements(recreate: bool) -> &'static [&'static str] {
    if recreate {
        &[DROP_SCHEMA, CREATE_SCHEMA]
    } else {
        &[DROP_SCHEMA]
    }
}

pub fn drop_schema<W>(
    console: &mut Console<W>,
    database: &DatabaseSettings,
    recreate: bool,
) -> anyhow::Result<()>
where
    W: Write,
{
    if !cfg!(feature = "postgres") {
        return Err(DropError::MissingDriver(DRIVER).into());
    }

    console.step("Dropping PostgreSQL...")?;

    execute(database, statements(recreate))?;

    console.ok()
}

/// django leaves unused connection fields as empty strings
#[cfg_attr(not(feature = "postgres"), allow(dead_code))]
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(feature = "postgres")]
fn connect_options(database: &DatabaseSettings) -> anyhow::Result<sqlx::postgres::PgConnectOptions> {
    use std::str::FromStr;

    use anyhow::Context;
    use sqlx::postgres::PgConnectOptions;

    let mut options = match &database.url {
        Some(url) => PgConnectOptions::from_str(url.as_str())
            .context("invalid postgres connection url")?,
        None => PgConnectOptions::new(),
    };

    if let Some(host) = non_empty(&database.host) {
        options = options.host(host);
    }

    if let Some(port) = database.port {
        options = options.port(port);
    }

    if let Some(user) = non_empty(&database.user) {
        options = options.username(user);
    }

    if let Some(password) = non_empty(&database.password) {
        options = options.password(password);
    }

    if let Some(name) = non_empty(&database.name) {
        options = options.database(name);
    }

    Ok(options)
}

#[cfg(feature = "postgres")]
fn execute(database: &DatabaseSettings, statements: &[&str]) -> anyhow::Result<()> {
    use anyhow::Context;
    use sqlx::{Connection, PgConnection};

    let options = connect_options(database)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create async runtime")?;

    runtime.block_on(async {
        log::debug!(
            "connecting to {}:{}",
            options.get_host(),
            options.get_port()
        );

        let mut conn = PgConnection::connect_with(&options).await
            .map_err(DropError::from)?;

        let mut tx = conn.begin().await
            .map_err(DropError::from)?;

        for statement in statements {
            log::debug!("executing: {}", statement);

            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(DropError::from)?;
        }

        tx.commit().await
            .map_err(DropError::from)?;

        closed(conn.close().await);

        Ok::<(), anyhow::Error>(())
    })
}

/// the reset is already committed when the connection closes, so a failure
/// here does not fail the command
#[cfg(feature = "postgres")]
fn closed(result: Result<(), sqlx::Error>) {
    if let Err(err) = result {
        log::warn!("failed to close postgres connection: {}", err);
    }
}

#[cfg(not(feature = "postgres"))]
fn execute(_database: &DatabaseSettings, _statements: &[&str]) -> anyhow::Result<()> {
    Err(DropError::MissingDriver(DRIVER).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(value: serde_json::Value) -> DatabaseSettings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn drop_then_recreate() {
        assert_eq!(
            statements(true),
            ["DROP SCHEMA IF EXISTS public CASCADE", "CREATE SCHEMA public"]
        );
        assert_eq!(statements(false), ["DROP SCHEMA IF EXISTS public CASCADE"]);
    }

    #[test]
    fn empty_fields_are_unset() {
        let database = settings(serde_json::json!({
            "engine": "postgres",
            "host": "",
            "user": "app"
        }));

        assert_eq!(non_empty(&database.host), None);
        assert_eq!(non_empty(&database.user), Some("app"));
        assert_eq!(non_empty(&database.password), None);
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn fields_override_url() {
        let database = settings(serde_json::json!({
            "engine": "django.db.backends.postgresql",
            "url": "postgres://url_user@example.com:6543/url_db",
            "name": "app",
            "port": 5433
        }));

        let options = connect_options(&database).unwrap();

        assert_eq!(options.get_host(), "example.com");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "url_user");
        assert_eq!(options.get_database(), Some("app"));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn close_failure_is_not_fatal() {
        closed(Ok(()));
        closed(Err(sqlx::Error::PoolClosed));
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn missing_driver() {
        let database = settings(serde_json::json!({"engine": "postgres"}));
        let mut console = Console::new(Vec::new());

        let err = drop_schema(&mut console, &database, true).unwrap_err();

        assert_eq!(err.to_string(), "package not found (sqlx-postgres)");
        assert!(crate::output::captured(console).is_empty());
    }

    /// runs against a disposable database named by `DBDROP_TEST_POSTGRES_URL`,
    /// everything in its `public` schema is destroyed
    #[cfg(feature = "postgres")]
    mod live {
        use super::*;

        use sqlx::{Connection, PgConnection};

        const URL_VAR: &str = "DBDROP_TEST_POSTGRES_URL";

        const PUBLIC_SCHEMAS: &str = "SELECT count(*) FROM pg_namespace WHERE nspname = 'public'";
        const PUBLIC_TABLES: &str = "SELECT count(*) FROM pg_tables WHERE schemaname = 'public'";

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
        }

        fn run(url: &str, sql: &str) {
            runtime().block_on(async {
                let mut conn = PgConnection::connect(url).await.unwrap();

                sqlx::query(sql).execute(&mut conn).await.unwrap();

                conn.close().await.unwrap();
            })
        }

        fn count(url: &str, sql: &str) -> i64 {
            runtime().block_on(async {
                let mut conn = PgConnection::connect(url).await.unwrap();

                let rtn: i64 = sqlx::query_scalar(sql).fetch_one(&mut conn).await.unwrap();

                conn.close().await.unwrap();

                rtn
            })
        }

        #[test]
        #[ignore = "needs a disposable postgres database in DBDROP_TEST_POSTGRES_URL"]
        fn reset_empties_public_schema() {
            let url = std::env::var(URL_VAR)
                .expect("DBDROP_TEST_POSTGRES_URL must name a disposable database");
            let database = settings(serde_json::json!({
                "engine": "django.db.backends.postgresql",
                "url": url,
            }));

            run(&url, "CREATE SCHEMA IF NOT EXISTS public");
            run(&url, "CREATE TABLE IF NOT EXISTS public.blog_post (id serial PRIMARY KEY)");
            assert!(count(&url, PUBLIC_TABLES) > 0);

            let mut console = Console::new(Vec::new());
            drop_schema(&mut console, &database, true).unwrap();

            assert_eq!(count(&url, PUBLIC_SCHEMAS), 1);
            assert_eq!(count(&url, PUBLIC_TABLES), 0);
            assert!(crate::output::captured(console).contains("Dropping PostgreSQL..."));

            // the recreated schema takes new objects
            run(&url, "CREATE TABLE public.blog_post (id serial PRIMARY KEY)");
            assert_eq!(count(&url, PUBLIC_TABLES), 1);

            let mut console = Console::new(Vec::new());
            drop_schema(&mut console, &database, false).unwrap();

            assert_eq!(count(&url, PUBLIC_SCHEMAS), 0);

            run(&url, "CREATE SCHEMA public");
        }
    }
}
