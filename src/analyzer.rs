//! Result assembler: fetch, parse, extract, score, raise issues and pick a
//! package, producing one immutable `AnalysisResult` per URL.

use crate::components::{
    CategoryScores, Issue, IssueCount, IssueEngine, NeedFlags, PackageRecommendation,
    RecommendationEngine,
};
use crate::config::AnalyzerConfig;
use crate::domain_utils::DomainUtils;
use crate::error::Result;
use crate::features::{FeatureEngine, PageSignals};
use crate::fetcher::{FetchResult, Fetcher, SiteProbes};
use crate::markup::ParsedPage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub final_url: String,
    pub domain: String,
    pub status_code: u16,
    pub response_time_ms: u64,
    pub is_https: bool,
    pub analyzed_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub signals: PageSignals,
    pub category_scores: CategoryScores,
    pub overall_score: u8,
    pub issues: Vec<Issue>,
    pub issue_count: IssueCount,
    pub need_flags: NeedFlags,
    pub recommendation: PackageRecommendation,
}

pub struct WebsiteAnalyzer {
    fetcher: Fetcher,
    features: FeatureEngine,
    issues: IssueEngine,
    recommendations: RecommendationEngine,
}

impl WebsiteAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(&config.fetcher)?,
            features: FeatureEngine::new(),
            issues: IssueEngine::new(),
            recommendations: RecommendationEngine::new(),
        })
    }

    /// Pin the year used for copyright freshness, for reproducible output.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.features = self.features.with_reference_year(year);
        self
    }

    /// Analyze one URL. Fails only when the page itself cannot be fetched.
    pub async fn analyze(&self, input: &str) -> Result<AnalysisResult> {
        let started = Instant::now();
        let url = Fetcher::normalize_url(input)?;
        log::info!("Analyzing {}", url);

        let (fetch, probes) = self.fetcher.fetch_with_probes(&url).await.map_err(|e| {
            log::warn!("Fetch failed for {}: {}", url, e);
            e
        })?;

        let mut result = self.analyze_fetched(&fetch, probes);
        result.duration_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "Analyzed {} in {}ms: overall {} ({} critical, {} warning, {} info) -> {}",
            result.final_url,
            result.duration_ms,
            result.overall_score,
            result.issue_count.critical,
            result.issue_count.warning,
            result.issue_count.info,
            result.recommendation.package_id
        );

        Ok(result)
    }

    /// Run everything after the network step over an already fetched page.
    pub fn analyze_fetched(&self, fetch: &FetchResult, probes: SiteProbes) -> AnalysisResult {
        let started = Instant::now();
        let page = ParsedPage::parse(fetch, probes);

        let signals = self.features.analyze(&page);
        let category_scores = CategoryScores::from_signals(&signals);
        let overall_score = category_scores.overall();
        let issues = self.issues.evaluate(&signals, &category_scores);
        let issue_count = IssueCount::from_issues(&issues);
        let need_flags = NeedFlags::from_signals(&signals, &category_scores);
        let recommendation = self
            .recommendations
            .recommend(overall_score, &issue_count, &need_flags);

        AnalysisResult {
            url: fetch.url.clone(),
            final_url: fetch.final_url.clone(),
            domain: DomainUtils::domain_of(&fetch.final_url)
                .or_else(|| DomainUtils::domain_of(&fetch.url))
                .unwrap_or_default(),
            status_code: fetch.status_code,
            response_time_ms: fetch.response_time_ms,
            is_https: page.is_https(),
            analyzed_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
            signals,
            category_scores,
            overall_score,
            issues,
            issue_count,
            need_flags,
            recommendation,
        }
    }
}
