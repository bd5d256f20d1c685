//! Sift CLI - saved transaction filters in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

mod commands;
mod output;

use commands::filter::OutputFormat;
use commands::{check, explain, filter, insights};

/// Sift - saved transaction filters in your terminal
#[derive(Parser)]
#[command(name = "sift", version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a query as a readable expression
    Explain {
        /// Query document path, or - for stdin
        query: Option<PathBuf>,
        /// Use a saved insight instead of a document
        #[arg(long, conflicts_with = "query")]
        saved: Option<String>,
        /// Lookups file for display names (overrides settings)
        #[arg(long)]
        lookups: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a query document
    Check {
        /// Query document path, or - for stdin
        query: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a query over a transaction file
    Filter {
        /// Query document path, or - for stdin
        query: Option<PathBuf>,
        /// Use a saved insight instead of a document
        #[arg(long, conflicts_with = "query")]
        saved: Option<String>,
        /// Transactions file (.csv or .json)
        #[arg(short, long)]
        transactions: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Output as JSON (shorthand for --format json)
        #[arg(long)]
        json: bool,
    },

    /// Manage saved insights
    Insights {
        #[command(subcommand)]
        command: insights::InsightsCommands,
    },
}

fn init_logging(verbose: u8) {
    let directive = match verbose {
        0 => std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        1 => "info".into(),
        2 => "debug".into(),
        _ => "trace".into(),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Explain { query, saved, lookups, json } => {
            explain::run(query.as_deref(), saved.as_deref(), lookups.as_deref(), json)?;
        }
        Commands::Check { query, json } => return check::run(query.as_deref(), json),
        Commands::Filter { query, saved, transactions, format, json } => {
            let format = if json { OutputFormat::Json } else { format };
            filter::run(query.as_deref(), saved.as_deref(), &transactions, format)?;
        }
        Commands::Insights { command } => insights::run(command)?,
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_filter(args: &[&str]) -> Result<OutputFormat, clap::Error> {
        let base = ["sift", "filter", "query.json", "--transactions", "ledger.csv"];
        let cli = Cli::try_parse_from(base.iter().chain(args))?;
        match cli.command {
            Commands::Filter { format, .. } => Ok(format),
            _ => panic!("expected the filter command"),
        }
    }

    #[test]
    fn test_filter_format_defaults_to_table() {
        assert_eq!(parse_filter(&[]).unwrap(), OutputFormat::Table);
        assert_eq!(parse_filter(&["--format", "csv"]).unwrap(), OutputFormat::Csv);
    }

    #[test]
    fn test_filter_rejects_unknown_format() {
        assert!(parse_filter(&["--format", "jsno"]).is_err());
    }

    #[test]
    fn test_saved_conflicts_with_document() {
        assert!(parse_filter(&["--saved", "coffee"]).is_err());
    }
}
