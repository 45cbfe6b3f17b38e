use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::token::{self, TokenArgs};

#[derive(Parser, Debug)]
#[command(name = "edgeauth", version, about = "EdgeAuth token issuer")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and sign a digest token.
    Token(TokenArgs),
}

fn main() -> anyhow::Result<()> {
    // stdout carries only the token.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Token(args) => token::issue(args)?,
    }

    Ok(())
}
