//! Read-only projection of an analysis for the outreach e-mail generator.

use crate::analyzer::AnalysisResult;
use crate::components::{Issue, IssueCategory};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachScores {
    pub total: u8,
    pub seo: u8,
    pub performance: u8,
    pub security: u8,
    pub accessibility: u8,
    pub social: u8,
    pub geo: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachSummary {
    pub domain: String,
    pub scores: OutreachScores,
    /// Critical issues first, then warnings; table order kept within each group.
    pub findings: Vec<Issue>,
    pub recommended_package: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl AnalysisResult {
    pub fn outreach_summary(&self) -> OutreachSummary {
        let scores = &self.category_scores;
        let findings = [IssueCategory::Critical, IssueCategory::Warning]
            .iter()
            .flat_map(|category| {
                self.issues
                    .iter()
                    .filter(move |issue| issue.category == *category)
                    .cloned()
            })
            .collect();

        OutreachSummary {
            domain: self.domain.clone(),
            scores: OutreachScores {
                total: self.overall_score,
                seo: scores.seo,
                performance: scores.performance,
                security: scores.security,
                accessibility: scores.accessibility,
                social: scores.social,
                geo: scores.geo,
            },
            findings,
            recommended_package: self.recommendation.package_id.clone(),
            contact_email: self.signals.geo.email.clone(),
            contact_phone: self.signals.geo.phone.clone(),
        }
    }
}
