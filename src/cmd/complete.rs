use std::{
    fs::File,
    io::{self, Write},
};

use clap::CommandFactory;
use clap_complete::Shell;
use eyre::{anyhow, Result, WrapErr};
use tokio::task;
use tracing::instrument;

use crate::interface::{CompspecCommand, CompspecParser};

/// Writes the shell script that completes `compspec` itself.
#[instrument]
pub async fn run(args: CompspecParser) -> Result<()> {
    let CompspecCommand::Completions(completions) = args.command else {
        return Err(anyhow!("shell completions called with wrong subcommand"));
    };

    task::spawn_blocking(move || -> Result<()> {
        let shell = Shell::from(completions.shell);
        match completions.file {
            None => write_completions(shell, &mut io::stdout().lock()),
            Some(path) => {
                let mut file =
                    File::create(&path).wrap_err_with(|| format!("creating {path}"))?;
                write_completions(shell, &mut file)?;
                tracing::info!(%path, ?shell, "wrote completions");
                Ok(())
            }
        }
    })
    .await?
}

fn write_completions<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    let mut cmd = <CompspecParser as CommandFactory>::command();
    let bin_name = cmd.get_name().to_string();

    clap_complete::generate(shell, &mut cmd, bin_name, out);
    out.flush().wrap_err("flushing completions")
}
