//! Recommendation Engine Component
//!
//! Maps the overall score, issue counts and need flags onto one service
//! package. The first matching row of the decision table wins.

use crate::components::issue_engine::IssueCount;
use crate::components::scoring_engine::CategoryScores;
use crate::features::PageSignals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServicePackage {
    CompleteRedesign,
    GrowthPlus,
    SeoBoost,
    StarterAudit,
    CarePlan,
}

impl ServicePackage {
    pub fn id(&self) -> &'static str {
        match self {
            ServicePackage::CompleteRedesign => "complete-redesign",
            ServicePackage::GrowthPlus => "growth-plus",
            ServicePackage::SeoBoost => "seo-boost",
            ServicePackage::StarterAudit => "starter-audit",
            ServicePackage::CarePlan => "care-plan",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServicePackage::CompleteRedesign => "Complete Web Redesign",
            ServicePackage::GrowthPlus => "Growth Plus",
            ServicePackage::SeoBoost => "SEO & Performance Boost",
            ServicePackage::StarterAudit => "Starter Optimization",
            ServicePackage::CarePlan => "Website Care Plan",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        [
            ServicePackage::CompleteRedesign,
            ServicePackage::GrowthPlus,
            ServicePackage::SeoBoost,
            ServicePackage::StarterAudit,
            ServicePackage::CarePlan,
        ]
        .into_iter()
        .find(|package| package.id() == id)
    }
}

/// Issue-pattern flags the decision table refines on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedFlags {
    pub has_security_issues: bool,
    pub has_performance_issues: bool,
    #[serde(rename = "hasSEOIssues")]
    pub has_seo_issues: bool,
    pub mobile_responsive: bool,
    pub has_geo_gaps: bool,
    pub has_social_gaps: bool,
    pub has_accessibility_issues: bool,
}

impl NeedFlags {
    pub fn from_signals(signals: &PageSignals, scores: &CategoryScores) -> Self {
        Self {
            has_security_issues: scores.security < 50 || signals.security.has_mixed_content,
            has_performance_issues: scores.performance < 50
                || !signals.performance.has_compression,
            has_seo_issues: scores.seo < 60,
            mobile_responsive: signals.technical.has_viewport,
            has_geo_gaps: scores.geo < 40,
            has_social_gaps: scores.social < 40,
            has_accessibility_issues: scores.accessibility < 60,
        }
    }

    /// One phrase per raised flag, in a fixed order.
    pub fn matched_needs(&self) -> Vec<String> {
        [
            (self.has_security_issues, "Security hardening"),
            (self.has_performance_issues, "Speed optimization"),
            (self.has_seo_issues, "Search engine optimization"),
            (!self.mobile_responsive, "Mobile responsive design"),
            (self.has_geo_gaps, "Local and AI search visibility"),
            (self.has_social_gaps, "Social media integration"),
            (self.has_accessibility_issues, "Accessibility improvements"),
        ]
        .into_iter()
        .filter(|(raised, _)| *raised)
        .map(|(_, need)| need.to_string())
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecommendation {
    pub package_id: String,
    pub package_name: String,
    pub confidence: u8,
    pub reasoning: String,
    pub matched_needs: Vec<String>,
}

/// Everything a decision row may look at.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub overall_score: u8,
    pub counts: &'a IssueCount,
    pub flags: &'a NeedFlags,
}

pub struct PackageRule {
    pub package: ServicePackage,
    pub reasoning: &'static str,
    pub applies: fn(&DecisionInput<'_>) -> bool,
    pub confidence: fn(&DecisionInput<'_>) -> u8,
}

pub const PACKAGE_RULES: &[PackageRule] = &[
    PackageRule {
        package: ServicePackage::CompleteRedesign,
        reasoning: "The site has fundamental problems across several areas; a rebuild is cheaper than patching.",
        applies: |input| input.overall_score < 50 || input.counts.critical >= 4,
        confidence: |_| 95,
    },
    PackageRule {
        package: ServicePackage::GrowthPlus,
        reasoning: "Several critical gaps hold the site back; a structured improvement programme is needed.",
        applies: |input| {
            input.overall_score < 65 || (input.counts.critical >= 2 && input.counts.warning >= 2)
        },
        confidence: |input| {
            if input.flags.has_security_issues && input.flags.has_performance_issues {
                90
            } else {
                85
            }
        },
    },
    PackageRule {
        package: ServicePackage::SeoBoost,
        reasoning: "The foundation is sound but search visibility and speed need targeted work.",
        applies: |input| {
            input.overall_score < 75 || (input.counts.critical >= 1 && input.counts.warning >= 2)
        },
        confidence: |input| {
            if input.flags.has_seo_issues && !input.flags.mobile_responsive {
                80
            } else {
                75
            }
        },
    },
    PackageRule {
        package: ServicePackage::StarterAudit,
        reasoning: "The site performs reasonably; a focused optimization pass fixes the remaining gaps.",
        applies: |input| input.overall_score < 90,
        confidence: |input| {
            let counts = input.counts;
            if counts.warning >= 3 {
                75
            } else if counts.warning + counts.info >= 5 {
                70
            } else if counts.warning >= 1 {
                65
            } else {
                60
            }
        },
    },
    PackageRule {
        package: ServicePackage::CarePlan,
        reasoning: "The site is in good shape; ongoing care keeps it that way.",
        applies: |_| true,
        confidence: |_| 60,
    },
];

pub struct RecommendationEngine {
    rules: &'static [PackageRule],
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            rules: PACKAGE_RULES,
        }
    }

    /// Pure function of its inputs: the same score, counts and flags always
    /// yield the same package and confidence.
    pub fn recommend(
        &self,
        overall_score: u8,
        counts: &IssueCount,
        flags: &NeedFlags,
    ) -> PackageRecommendation {
        let input = DecisionInput {
            overall_score,
            counts,
            flags,
        };

        // The last row always applies.
        let rule = self
            .rules
            .iter()
            .find(|rule| (rule.applies)(&input))
            .unwrap_or(&PACKAGE_RULES[PACKAGE_RULES.len() - 1]);

        let recommendation = PackageRecommendation {
            package_id: rule.package.id().to_string(),
            package_name: rule.package.display_name().to_string(),
            confidence: (rule.confidence)(&input),
            reasoning: rule.reasoning.to_string(),
            matched_needs: flags.matched_needs(),
        };

        log::debug!(
            "Recommending {} ({}% confidence) for overall score {}",
            recommendation.package_id,
            recommendation.confidence,
            overall_score
        );

        recommendation
    }
}
