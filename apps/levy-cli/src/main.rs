//! # Levy CLI
//!
//! Tax resolution from the command line.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        levy                                             │
//! │                                                                         │
//! │  env (LEVY_*) ──► CliConfig ◄── flags (--rates, --log, --compact)       │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │  rates.toml ──► InMemoryDirectory ──► TaxResolver                       │
//! │                                           │                             │
//! │  order.json ──────────────────────────────┘──► JSON on stdout           │
//! │                                                                         │
//! │  tracing ──► stderr                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;

use anyhow::Context;
use levy_core::{TaxAddress, TaxResolver};
use levy_directory::InMemoryDirectory;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::commands::{calculate, check, lookup, print_json, CommandLine, Commands};
use crate::config::CliConfig;

fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    let config = CliConfig::load()?.with_overrides(cli.rates, cli.log, cli.compact)?;

    // Logs go to stderr so stdout stays parseable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!(
        rates_path = %config.rates_path.display(),
        pretty = config.pretty,
        "Configuration loaded"
    );

    let directory = InMemoryDirectory::load(&config.rates_path)
        .with_context(|| format!("Failed to load rate table {}", config.rates_path.display()))?;
    info!(
        zones = directory.zones().len(),
        rates = directory.rates().len(),
        "Rate table loaded"
    );

    match cli.command {
        Commands::Calculate { order, batch } => {
            let resolver = TaxResolver::new(&directory, &directory);
            calculate::run(&resolver, &order, batch, config.pretty)
        }
        Commands::Check => {
            let report = check::summarize(&config.rates_path, &directory);
            print_json(&report, config.pretty)
        }
        Commands::Lookup {
            country,
            state,
            zip,
            category,
            date,
        } => {
            let address = TaxAddress {
                country_iso: country,
                state_abbr: state,
                zipcode: zip,
            };
            let report = lookup::lookup(&directory, address, category.as_deref(), date)?;
            print_json(&report, config.pretty)
        }
    }
}
