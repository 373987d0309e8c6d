//! Entry point for the gamemaker-rs CLI

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};

use gamemaker_rs::cli::{Cli, Commands};
use gamemaker_rs::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = cli.log_level() {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Anim { command } => commands::anim::execute(command),
        Commands::Completions { shell } => {
            write_completions(shell);
            Ok(())
        }
    }
}

fn write_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
