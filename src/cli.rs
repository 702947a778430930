use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{cache::FingerprintMode, filter::HostStatusFilter};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean, filter, and summarize short-term rental listings",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the listing count, mean nightly rate, and mean occupancy
    Summary(QueryArgs),
    /// Print every aggregate chart series as tables
    Breakdown(QueryArgs),
    /// Write map marker tuples for the filtered listings as CSV
    Markers(ExportArgs),
    /// Write the filtered, cleaned listing rows as CSV
    Rows(ExportArgs),
    /// Emit the full dashboard report as JSON
    Report(ReportArgs),
    /// Print the room-type options and default price bounds
    Options(OptionsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Listing CSV file (falls back to the config file, then LISTING_INSIGHTS_SOURCE)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// How source changes are detected between loads
    #[arg(long, value_enum)]
    pub fingerprint: Option<FingerprintMode>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Room type to include, as shown by `options` or in raw form (repeatable; default all)
    #[arg(long = "room-type", action = clap::ArgAction::Append)]
    pub room_types: Vec<String>,
    /// Lowest nightly rate to include, in currency units
    #[arg(long = "min-price", conflicts_with = "min_price_k")]
    pub min_price: Option<i64>,
    /// Highest nightly rate to include, in currency units
    #[arg(long = "max-price", conflicts_with = "max_price_k")]
    pub max_price: Option<i64>,
    /// Lowest nightly rate to include, in thousands
    #[arg(long = "min-price-k")]
    pub min_price_k: Option<i64>,
    /// Highest nightly rate to include, in thousands
    #[arg(long = "max-price-k")]
    pub max_price_k: Option<i64>,
    /// Restrict to superhosts or regular hosts
    #[arg(long = "host-status", value_enum, default_value_t = HostStatusFilter::All)]
    pub host_status: HostStatusFilter,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output delimiter (defaults to ',')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Emit single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filter_flags_parse() {
        let cli = Cli::try_parse_from([
            "listing-insights",
            "summary",
            "-i",
            "listings.csv",
            "--room-type",
            "Entire Home",
            "--room-type",
            "private_room",
            "--min-price-k",
            "100",
            "--host-status",
            "superhost",
        ])
        .expect("parse");
        let Commands::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.filters.room_types.len(), 2);
        assert_eq!(args.filters.min_price_k, Some(100));
        assert_eq!(args.filters.host_status, HostStatusFilter::SuperhostOnly);
    }

    #[test]
    fn raw_and_thousands_prices_conflict() {
        let result = Cli::try_parse_from([
            "listing-insights",
            "summary",
            "--min-price",
            "1000",
            "--min-price-k",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn delimiter_names_resolve() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("ab").is_err());
    }
}
