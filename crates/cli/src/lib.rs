pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use farmlink_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "farmlink",
    about = "Farmlink operator CLI",
    long_about = "Operate Farmlink migrations, demo fixtures, catalog browsing, config inspection, and readiness checks.",
    after_help = "Examples:\n  farmlink migrate\n  farmlink seed\n  farmlink browse --category Rice\n  farmlink doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and verify it landed")]
    Seed,
    #[command(about = "Page through a category, partitioning results by deliverability")]
    Browse {
        #[arg(long, help = "Product category to browse")]
        category: String,
        #[arg(long, help = "Buyer longitude (defaults to the configured location)")]
        longitude: Option<f64>,
        #[arg(long, help = "Buyer latitude (defaults to the configured location)")]
        latitude: Option<f64>,
        #[arg(long, help = "Page size override (defaults to the configured page size)")]
        page_size: Option<u32>,
        #[arg(long, help = "Stop after this many pages instead of walking to the end")]
        max_pages: Option<u32>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and database readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Browse { category, longitude, latitude, page_size, max_pages } => {
            commands::browse::run(commands::browse::BrowseArgs {
                category,
                longitude,
                latitude,
                page_size,
                max_pages,
            })
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so the structured command output on stdout stays
/// parseable. Falls back to compact INFO when no config file is readable.
fn init_logging() {
    use tracing::Level;

    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
