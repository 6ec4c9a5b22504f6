pub mod accessibility;
pub mod content;
pub mod geo;
pub mod performance;
pub mod security;
pub mod social;
pub mod technical;
pub mod technology;

use crate::markup::ParsedPage;
use serde::{Deserialize, Serialize};

pub use accessibility::{AccessibilityAnalyzer, AccessibilitySignals};
pub use content::{ContentAnalyzer, ContentSignals, ReadabilityLevel};
pub use geo::{GeoAnalyzer, GeoSignals};
pub use performance::{PerformanceAnalyzer, PerformanceSignals};
pub use security::{SecurityAnalyzer, SecuritySignals};
pub use social::{SocialAnalyzer, SocialSignals};
pub use technical::{KeywordDensity, TechnicalAnalyzer, TechnicalSignals};
pub use technology::{TechnologyAnalyzer, TechnologySignals};

/// One analyzer module. Extractors hold no per-page state: the same extractor
/// can be applied to any number of pages and always returns the same signals
/// for the same page. Internal failures degrade to documented defaults rather
/// than surfacing as errors.
pub trait SignalExtractor {
    type Signals;

    fn name(&self) -> &str;
    fn extract(&self, page: &ParsedPage) -> Self::Signals;
}

/// Output of every analyzer module for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSignals {
    pub technical: TechnicalSignals,
    pub content: ContentSignals,
    pub technology: TechnologySignals,
    pub security: SecuritySignals,
    pub performance: PerformanceSignals,
    pub open_graph: SocialSignals,
    pub accessibility: AccessibilitySignals,
    pub geo: GeoSignals,
}

pub struct FeatureEngine {
    technical: TechnicalAnalyzer,
    content: ContentAnalyzer,
    technology: TechnologyAnalyzer,
    security: SecurityAnalyzer,
    performance: PerformanceAnalyzer,
    social: SocialAnalyzer,
    accessibility: AccessibilityAnalyzer,
    geo: GeoAnalyzer,
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureEngine {
    pub fn new() -> Self {
        Self {
            technical: TechnicalAnalyzer::new(),
            content: ContentAnalyzer::new(),
            technology: TechnologyAnalyzer::new(),
            security: SecurityAnalyzer::new(),
            performance: PerformanceAnalyzer::new(),
            social: SocialAnalyzer::new(),
            accessibility: AccessibilityAnalyzer::new(),
            geo: GeoAnalyzer::new(),
        }
    }

    /// Pin the year used for copyright freshness checks.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.geo = GeoAnalyzer::with_reference_year(year);
        self
    }

    pub fn analyze(&self, page: &ParsedPage) -> PageSignals {
        let signals = PageSignals {
            technical: self.run(&self.technical, page),
            content: self.run(&self.content, page),
            technology: self.run(&self.technology, page),
            security: self.run(&self.security, page),
            performance: self.run(&self.performance, page),
            open_graph: self.run(&self.social, page),
            accessibility: self.run(&self.accessibility, page),
            geo: self.run(&self.geo, page),
        };

        log::debug!(
            "Module scores for {}: security={} performance={} social={} accessibility={} geo={}",
            page.url(),
            signals.security.score,
            signals.performance.score,
            signals.open_graph.score,
            signals.accessibility.score,
            signals.geo.score
        );

        signals
    }

    fn run<E: SignalExtractor>(&self, extractor: &E, page: &ParsedPage) -> E::Signals {
        log::debug!("Running {} analyzer", extractor.name());
        extractor.extract(page)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}
