//! Runs the extractor over the selected sources and collects one table.
//!
//! Each source is an isolated unit of work: an extraction error is logged once,
//! recorded as a [`SourceFailure`], and contributes no headlines. Nothing a
//! single source does can stop the others.
//!
//! # Ordering
//!
//! Records are appended source by source (in the order requested), then
//! selector by selector, then in page order. With `concurrency > 1` several
//! sources are fetched at once, but results are still stitched together in
//! the requested order.

use crate::models::{RunReport, SourceFailure};
use crate::registry::{Registry, RegistryError, Source};
use crate::scrapers::extractor::extract;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{info, instrument, warn};

/// Scrape the named sources from `registry`.
///
/// Unknown names are rejected before any request is made.
#[instrument(level = "info", skip_all, fields(sources = names.len(), concurrency = concurrency))]
pub async fn run<S: AsRef<str>>(
    client: &Client,
    registry: &Registry,
    names: &[S],
    concurrency: usize,
) -> Result<RunReport, RegistryError> {
    let sources = registry.resolve(names)?;
    Ok(run_sources(client, &sources, concurrency).await)
}

/// Scrape already-resolved sources, at most `concurrency` at a time.
pub async fn run_sources(client: &Client, sources: &[&Source], concurrency: usize) -> RunReport {
    let outcomes: Vec<RunReport> = stream::iter(sources.iter().copied())
        .map(|source| scrape_source(client, source))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = RunReport::default();
    for outcome in outcomes {
        report.table.append(outcome.table);
        report.failures.extend(outcome.failures);
    }

    info!(
        sources = sources.len(),
        headlines = report.table.len(),
        failures = report.failures.len(),
        "Finished scraping"
    );
    report
}

/// Run every selector plan of one source in declaration order.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
async fn scrape_source(client: &Client, source: &Source) -> RunReport {
    info!(url = %source.url, "Scraping source");
    let mut report = RunReport::default();

    for plan in source.selectors.plans() {
        match extract(client, source, plan).await {
            Ok(headlines) => report.table.extend_from_source(&source.name, headlines),
            Err(e) => {
                warn!(
                    source = %source.name,
                    url = %source.url,
                    selector = %plan.selector,
                    error = %e,
                    "Failed to scrape source"
                );
                report.failures.push(SourceFailure {
                    source: source.name.clone(),
                    url: source.url.to_string(),
                    selector: plan.selector.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    report
}
