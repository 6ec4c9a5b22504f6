//! Error types for the analyzer.

use thiserror::Error;

/// Failures of the primary page fetch. Any of these aborts the analysis run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Timed out after {seconds}s fetching {url}")]
    Timeout { url: String, seconds: u64 },

    #[error("HTTP {status} returned by {url}")]
    Status { url: String, status: u16 },

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Failed to fetch website: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Document has no readable text")]
    EmptyDocument,
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
