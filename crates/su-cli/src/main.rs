//! schema-upgrader CLI - apply numbered SQL scripts to a database exactly once

use anyhow::Result;
use clap::{CommandFactory, Parser};

mod cli;
mod commands;

use cli::Cli;
use commands::{common, upgrade};

#[tokio::main]
async fn main() -> Result<()> {
    // Without any arguments there is nothing safe to assume, so only show help.
    if std::env::args_os().len() <= 1 {
        Cli::command().print_long_help()?;
        return Ok(());
    }

    let cli = Cli::parse();
    common::init_logging(cli.verbose);
    upgrade::execute(&cli).await
}
