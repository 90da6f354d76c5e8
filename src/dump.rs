use std::io::Write;

use clap::Args;
use anyhow::Context;

use crate::settings::{Project, ProjectArgs};

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// pretty prints the output
    #[arg(long)]
    pretty: bool,
}

/// writes the resolved settings as json. passwords are never written
pub fn write_settings<W>(out: &mut W, project: &Project, pretty: bool) -> anyhow::Result<()>
where
    W: Write,
{
    log::info!("settings loaded from {}", project.path().display());

    if pretty {
        serde_json::to_writer_pretty(&mut *out, &project.settings)
            .context("failed writing settings to output")?;
    } else {
        serde_json::to_writer(&mut *out, &project.settings)
            .context("failed writing settings to output")?;
    }

    writeln!(out).context("failed writing settings to output")
}

pub fn dump_settings(args: DumpArgs, project_args: &ProjectArgs) -> anyhow::Result<()> {
    let project = project_args.load()?;

    write_settings(&mut std::io::stdout(), &project, args.pretty)
}
