//! Inquest CLI: the `inquest` command.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Serve {
            server_name,
            server_version,
        } => commands::serve::run(commands::serve::Args {
            server_name,
            server_version,
        }),
    }
}
