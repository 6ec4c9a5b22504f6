pub mod analyzer;
pub mod components;
pub mod config;
pub mod domain_utils;
pub mod error;
pub mod features;
pub mod fetcher;
pub mod markup;
pub mod outreach;

pub use analyzer::{AnalysisResult, WebsiteAnalyzer};
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, FetchError};
pub use fetcher::{FetchResult, Fetcher, SiteProbes};
pub use markup::{ParsedPage, ResponseHeaders};
pub use outreach::OutreachSummary;
