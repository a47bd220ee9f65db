mod commands;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use tripscan_core::{Environment, ListingFilters, ScrapeEnvelope};

#[derive(Debug, Parser)]
#[command(name = "tripscan")]
#[command(about = "Scrapes travel packages from the booking site and prints JSON envelopes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one listing page, optionally visiting every detail page.
    Listing {
        /// Month name (`setembro`), two-digit code (`09`) or `all`.
        #[arg(default_value = "all")]
        month: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Also scrape and merge each package's detail page.
        #[arg(long)]
        details: bool,
    },
    /// Scrape a single detail page.
    Detail { url: String },
    /// List the month tokens the site accepts, with their listing URLs.
    Months,
    /// Scrape a listing and keep packages priced within an inclusive range.
    PriceRange {
        #[arg(long)]
        min: Option<Decimal>,
        #[arg(long)]
        max: Option<Decimal>,
        #[arg(long, default_value = "all")]
        month: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
struct FilterArgs {
    #[arg(long)]
    destination: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Departure city filter.
    #[arg(long)]
    departure: Option<String>,
}

impl From<FilterArgs> for ListingFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            destination: args.destination,
            category: args.category,
            departure: args.departure,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            let envelope = ScrapeEnvelope::<()>::failure(format!("{e:#}"));
            match serde_json::to_string_pretty(&envelope) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = tripscan_core::load_app_config()?;
    init_tracing(&config.log_level, &config.env)?;
    tracing::debug!(config = ?config, "configuration loaded");

    let value = match cli.command {
        Commands::Listing {
            month,
            filters,
            details,
        } => commands::listing(&config, &month, &filters.into(), details).await?,
        Commands::Detail { url } => commands::detail(&config, &url).await?,
        Commands::Months => commands::months(&config)?,
        Commands::PriceRange {
            min,
            max,
            month,
            filters,
        } => commands::price_range(&config, &month, &filters.into(), min, max).await?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Logs go to stderr so stdout carries only the JSON envelope.
fn init_tracing(log_level: &str, env: &Environment) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(colored_logs(env))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Production logs are collected by a supervisor, not read on a terminal.
fn colored_logs(env: &Environment) -> bool {
    !matches!(env, Environment::Production)
}
