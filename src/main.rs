//! # Sports Headlines
//!
//! Collects headlines from sports-news homepages. Each site is described in a
//! YAML registry (URL, CSS selector(s), attribute preferences, limits and
//! offsets); one generic extractor reads every site, and the results are shown
//! as a table and optionally exported.
//!
//! ## Usage
//!
//! ```sh
//! sports_headlines -s Ole -s "TyC Sports" -o titulares.csv --trends
//! ```
//!
//! ## Architecture
//!
//! 1. **Registry**: load the embedded (or a user-supplied) source table
//! 2. **Scraping**: fetch each selected homepage and extract headlines, one
//!    source at a time unless `--concurrency` says otherwise
//! 3. **Output**: table or CSV/JSON on stdout, CSV file, dated JSON snapshot,
//!    and an optional word-frequency report

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregator;
mod cli;
mod models;
mod outputs;
mod registry;
mod scrapers;
mod utils;

use cli::{Cli, Format};
use models::{RunReport, Snapshot};
use outputs::{csv, json, table, trends};
use registry::{ExtractionMode, Registry};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr; stdout carries the results) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Registry ----
    let registry = match &args.registry {
        Some(path) => Registry::load(path).await?,
        None => Registry::embedded()?,
    };

    if args.list_sources {
        print!("{}", render_source_list(&registry));
        return Ok(());
    }

    let selected: Vec<String> = if args.all {
        registry.iter().map(|s| s.name.clone()).collect()
    } else if !args.sources.is_empty() {
        args.sources.clone()
    } else {
        registry.defaults().iter().map(|s| s.name.clone()).collect()
    };
    if selected.is_empty() {
        error!("No sources selected; pass --source NAME or --all");
        return Err("no sources selected".into());
    }
    info!(count = selected.len(), sources = ?selected, "Selected sources");

    // Fail on bad output paths before spending time on the network.
    if let Some(path) = &args.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_writable_dir(parent).await?;
        }
    }
    if let Some(dir) = &args.json_output_dir {
        ensure_writable_dir(dir).await?;
    }

    // ---- Scrape ----
    let client = scrapers::build_client(Duration::from_secs(args.timeout_secs))?;
    let report = aggregator::run(&client, &registry, selected.as_slice(), args.concurrency).await?;

    deliver(&report, &args).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        headlines = report.table.len(),
        failures = report.failures.len(),
        "Execution complete"
    );

    Ok(())
}

/// Print the finished run and write the requested exports.
///
/// Failures were already logged by the aggregator. An empty table is logged
/// once as an error and nothing is printed or written.
async fn deliver(report: &RunReport, args: &Cli) -> Result<(), Box<dyn Error>> {
    if report.table.is_empty() {
        error!(
            failures = report.failures.len(),
            "No headlines found in the selected sources"
        );
        return Err("no headlines found in the selected sources".into());
    }

    match args.format {
        Format::Table => print!("{}", table::render(&report.table, args.header)),
        Format::Csv => print!("{}", csv::to_csv_string(&report.table, args.header)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report.table)?),
    }

    if let Some(path) = &args.output {
        csv::write_csv(path, &report.table, args.header).await?;
        info!(path = %path.display(), rows = report.table.len(), "Saved CSV");
    }

    if let Some(dir) = &args.json_output_dir {
        let snapshot = Snapshot::new(Local::now(), report);
        if let Err(e) = json::write_snapshot(&snapshot, dir).await {
            error!(error = %e, "Failed to write JSON snapshot");
        }
    }

    if args.trends {
        let frequencies = trends::word_frequencies(&report.table);
        println!();
        print!("{}", trends::render_frequencies(&frequencies, args.top));
        println!();
        println!("{}", trends::summarize(&report.table, &frequencies, args.top));
    }

    Ok(())
}

/// One line per configured source: default marker, name, mode and URL.
fn render_source_list(registry: &Registry) -> String {
    let width = registry
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);

    registry
        .iter()
        .map(|s| {
            let marker = if s.default_selected { '*' } else { ' ' };
            let mode = match s.mode {
                ExtractionMode::Standard => "standard",
                ExtractionMode::ImageAlt { .. } => "image_alt",
            };
            format!("{marker} {:<width$}  {mode:<9}  {}\n", s.name, s.url)
        })
        .collect()
}
