use clap::Args;

use crate::db;
use crate::output::Console;
use crate::settings::ProjectArgs;

#[derive(Debug, Args)]
pub struct DropArgs {}

pub fn drop_db(_args: DropArgs, project_args: &ProjectArgs) -> anyhow::Result<()> {
    let project = project_args.load()?;
    let mut console = Console::stdout();

    console.heading("Dropping databases:")?;

    db::reset(&mut console, &project, &project_args.database)
}
