mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // .env is optional
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        print_error(&format!("Failed to load .env file: {e}"));
    }

    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    match &cli.command {
        Commands::Keygen(args) => {
            commands::keys::keygen(args.bytes)?;
        }
        Commands::Issue(args) => {
            let cfg = config::resolve_valid(&cli)?;
            commands::tokens::issue(cfg, &args.kind)?;
        }
        Commands::Verify(args) => {
            let cfg = config::resolve_valid(&cli)?;
            commands::tokens::verify(cfg, args.kind, &args.token)?;
        }
        Commands::Inspect(args) => {
            let cfg = config::resolve_valid(&cli)?;
            commands::tokens::inspect(cfg, &args.token)?;
        }
        Commands::Refresh(args) => {
            let cfg = config::resolve_valid(&cli)?;
            commands::tokens::refresh(cfg, &args.token)?;
        }
        Commands::Config => {
            let cfg = config::resolve(&cli)?;
            commands::tokens::show_config(&cfg);
        }
    }

    Ok(())
}
