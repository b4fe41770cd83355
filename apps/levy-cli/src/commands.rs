pub mod calculate;
pub mod check;
pub mod lookup;

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "levy")]
#[command(about = "Resolve sales tax and VAT for orders against a rate table.")]
pub struct CommandLine {
    /// Rate table file (overrides LEVY_RATES_PATH)
    #[arg(long, global = true)]
    pub rates: Option<PathBuf>,

    /// Log filter directive (overrides LEVY_LOG)
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate taxes for an order JSON file ("-" reads stdin)
    #[command(alias = "c")]
    Calculate {
        order: PathBuf,

        /// The input is an array of orders, each calculated independently
        #[arg(long)]
        batch: bool,
    },
    /// Validate the rate table and print a summary
    Check,
    /// Show the rates a directory returns for an address
    #[command(alias = "l")]
    Lookup {
        #[arg(long)]
        country: String,

        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        zip: Option<String>,

        /// Only keep rates covering this tax category
        #[arg(long)]
        category: Option<String>,

        /// Evaluate validity windows at this RFC 3339 instant
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Writes `value` as JSON to stdout.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
