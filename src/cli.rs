//! Command-line interface definitions.
//!
//! Registry path, timeout and concurrency can also come from environment
//! variables.

use crate::outputs::csv::HeaderVariant;
use crate::scrapers::DEFAULT_TIMEOUT;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What to print on stdout once scraping is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Aligned two-column table
    Table,
    /// CSV, same as the `--output` file
    Csv,
    /// JSON array of `{source, text}` records
    Json,
}

/// Scrape headlines from sports-news homepages.
///
/// # Examples
///
/// ```sh
/// # Preselected sources, table on stdout
/// sports_headlines
///
/// # Two sources, saved as CSV
/// sports_headlines -s Ole -s Marca -o titulares.csv
///
/// # Everything, four sites at a time, with a word-frequency report
/// sports_headlines --all -c 4 --trends
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source to scrape (repeatable); defaults to the preselected sources
    #[arg(short, long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// Scrape every source in the registry
    #[arg(long, conflicts_with = "sources")]
    pub all: bool,

    /// List configured sources and exit
    #[arg(long)]
    pub list_sources: bool,

    /// Write the headlines to this CSV file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Name of the headline column in CSV and table output
    #[arg(long, value_enum, default_value_t = HeaderVariant::Titular)]
    pub header: HeaderVariant,

    /// What to print on stdout
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Directory for dated JSON snapshots of the run
    #[arg(short, long, value_name = "DIR")]
    pub json_output_dir: Option<PathBuf>,

    /// Print a word-frequency report and a short trend summary
    #[arg(long)]
    pub trends: bool,

    /// Number of words shown in the frequency report
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Source registry YAML replacing the built-in one
    #[arg(short, long, env = "HEADLINES_REGISTRY", value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "HEADLINES_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Number of sources fetched at the same time
    #[arg(short, long, env = "HEADLINES_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,
}
