//! Fetching sports homepages and pulling headlines out of them.
//!
//! All sources share one generic extractor ([`extractor`]) driven by the
//! registry; there is no per-site scraping code. A run uses a single
//! [`reqwest::Client`] built by [`build_client`], which carries the per-request
//! timeout and User-Agent.
//!
//! # Extraction Strategies
//!
//! | Mode | Input | Notes |
//! |------|-------|-------|
//! | Standard | CSS selector | Visible text or attribute with fallback |
//! | Standard, multi-selector | Several selectors | Run in order, results concatenated |
//! | Image-alt | Every `<img alt>` | Windowed by offset/count, exclusion terms filtered |

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

pub mod extractor;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; sports_headlines/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a single extraction produced no headlines.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Connection failure, timeout, or unreadable body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The configured CSS selector does not parse.
    #[error("invalid CSS selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

/// Build the HTTP client shared by every fetch of a run.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
