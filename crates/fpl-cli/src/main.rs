mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};

fn main() {
    // Respects RUST_LOG; defaults to info on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Solve(args) => commands::solve::run(args),
        Command::Simulate(args) => commands::simulate::run(args),
        Command::ExportMps(args) => commands::export_mps::run(args),
    };

    if let Err(err) = result {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}
