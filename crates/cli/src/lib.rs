pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use netprice_core::config::{AppConfig, LoadOptions, LoggingConfig};

#[derive(Debug, Parser)]
#[command(
    name = "netprice",
    about = "Agreement condition pricing CLI",
    long_about = "Evaluate net prices from agreement conditions against the condition database.",
    after_help = "Examples:\n  netprice migrate\n  netprice seed\n  \
                  netprice price --tenant demo --customer CUST-100 --material MAT-STEEL-01 \
                  --quantity 20 --date 2026-06-15"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load and verify the deterministic demo agreement")]
    Seed,
    #[command(about = "Evaluate the net price for one pricing context")]
    Price(commands::price::PriceArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&effective_logging());

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Price(args) => commands::price::run(&args),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logging settings the CLI would install for the current environment.
pub fn effective_logging() -> LoggingConfig {
    AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging)
}
