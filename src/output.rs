use std::io::Write;

use anyhow::Context;
use colored::Colorize;

/// status output for the user, separate from the log output on stderr
pub struct Console<W> {
    out: W,
}

impl Console<std::io::Stdout> {
    pub fn stdout() -> Self {
        Console::new(std::io::stdout())
    }
}

impl<W> Console<W>
where
    W: Write,
{
    pub fn new(out: W) -> Self {
        Console { out }
    }

    pub fn heading(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{}", text.cyan().bold())
            .context("failed writing to output")
    }

    /// starts a status line that is finished by [`Console::ok`]
    pub fn step(&mut self, text: &str) -> anyhow::Result<()> {
        write!(self.out, "  {}", text.bold())
            .and_then(|_| self.out.flush())
            .context("failed writing to output")
    }

    pub fn ok(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, " {}", "OK".green())
            .context("failed writing to output")
    }

    pub fn info(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "  {}", text.bold())
            .context("failed writing to output")
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
pub fn captured(console: Console<Vec<u8>>) -> String {
    String::from_utf8(console.into_inner()).unwrap()
}
