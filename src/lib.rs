pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod columns;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod io_utils;
pub mod loader;
pub mod normalize;
pub mod policy;
pub mod report;
pub mod schema;
pub mod session;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("listing_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Summary(args) => dashboard::execute_summary(&args),
        Commands::Breakdown(args) => dashboard::execute_breakdown(&args),
        Commands::Markers(args) => export::execute_markers(&args),
        Commands::Rows(args) => export::execute_rows(&args),
        Commands::Report(args) => dashboard::execute_report(&args),
        Commands::Options(args) => dashboard::execute_options(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
