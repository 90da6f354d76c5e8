use clap::{Parser, Subcommand};

mod error;
mod fs;
mod logging;
mod output;
mod path;
mod settings;

mod db;
mod dump;
mod migrations;
mod reset;

/// resets the persistent state of a web application during development
///
/// drops the configured database (the public schema for postgres, the
/// database file for sqlite) and optionally removes the generated migration
/// files of every installed app. settings are read from the first
/// dbdrop.json found in the current directory or one of its parents.
#[derive(Debug, Parser)]
#[command(max_term_width(80))]
struct AppArgs {
    #[command(subcommand)]
    cmd: Option<Cmd>,

    #[command(flatten)]
    project: settings::ProjectArgs,

    /// also removes migration files after dropping the database
    #[arg(short, long)]
    migration: bool,

    /// verbose logging for commands
    #[arg(short = 'V', long, global = true, conflicts_with("debug"))]
    verbose: bool,

    /// debug logging for commands
    #[arg(long, global = true, conflicts_with("verbose"))]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// only drops the database
    Db(db::drop::DropArgs),

    /// only removes migration files
    Migrations(migrations::MigrationsArgs),

    /// prints the resolved settings without the password
    Settings(dump::DumpArgs),
}

fn main() -> anyhow::Result<()> {
    path::set_cwd()?;

    let args = AppArgs::parse();

    logging::init(args.verbose, args.debug);

    match args.cmd {
        Some(Cmd::Db(drop_args)) => db::drop::drop_db(drop_args, &args.project),
        Some(Cmd::Migrations(migrations_args)) => {
            migrations::remove_migrations(migrations_args, &args.project)
        }
        Some(Cmd::Settings(dump_args)) => dump::dump_settings(dump_args, &args.project),
        None => {
            let project = args.project.load()?;
            let mut console = output::Console::stdout();

            reset::reset(&mut console, &project, &args.project.database, args.migration)
        }
    }
}
