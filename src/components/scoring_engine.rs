//! Scoring Engine
//!
//! Turns module signals into the six category scores and the weighted overall
//! score. The weights and the SEO checklist are a fixed output contract.

use crate::features::{PageSignals, TechnicalSignals};
use serde::{Deserialize, Serialize};

pub const SEO_WEIGHT: f64 = 0.25;
pub const PERFORMANCE_WEIGHT: f64 = 0.20;
pub const SECURITY_WEIGHT: f64 = 0.10;
pub const ACCESSIBILITY_WEIGHT: f64 = 0.15;
pub const SOCIAL_WEIGHT: f64 = 0.15;
pub const GEO_WEIGHT: f64 = 0.15;

/// One line of a scoring table: the weight is applied when the condition holds.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRule {
    pub condition: bool,
    pub weight: i32,
}

impl ScoreRule {
    pub fn new(condition: bool, weight: i32) -> Self {
        Self { condition, weight }
    }
}

/// Sum the weights of every rule whose condition holds onto `base`, clamped
/// to 0..=100.
pub fn reduce_score(base: i32, rules: &[ScoreRule]) -> u8 {
    let total = rules
        .iter()
        .filter(|rule| rule.condition)
        .fold(base, |acc, rule| acc + rule.weight);
    total.clamp(0, 100) as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub seo: u8,
    pub performance: u8,
    pub security: u8,
    pub accessibility: u8,
    pub social: u8,
    pub geo: u8,
}

impl CategoryScores {
    pub fn from_signals(signals: &PageSignals) -> Self {
        Self {
            seo: seo_score(&signals.technical),
            performance: signals.performance.score,
            security: signals.security.score,
            accessibility: signals.accessibility.score,
            social: signals.open_graph.score,
            geo: signals.geo.score,
        }
    }

    /// Fixed weighted combination of the six categories, rounded.
    pub fn overall(&self) -> u8 {
        let weighted = self.seo as f64 * SEO_WEIGHT
            + self.performance as f64 * PERFORMANCE_WEIGHT
            + self.security as f64 * SECURITY_WEIGHT
            + self.accessibility as f64 * ACCESSIBILITY_WEIGHT
            + self.social as f64 * SOCIAL_WEIGHT
            + self.geo as f64 * GEO_WEIGHT;
        weighted.round().clamp(0.0, 100.0) as u8
    }
}

/// SEO checklist over the technical signals.
pub fn seo_score(technical: &TechnicalSignals) -> u8 {
    reduce_score(
        0,
        &[
            ScoreRule::new(technical.title.is_some(), 15),
            ScoreRule::new(technical.meta_description.is_some(), 15),
            ScoreRule::new(technical.has_canonical, 10),
            ScoreRule::new(technical.headings.h1 == 1, 10),
            ScoreRule::new(technical.heading_hierarchy_valid, 5),
            ScoreRule::new(technical.has_structured_data, 10),
            ScoreRule::new(technical.has_sitemap, 10),
            ScoreRule::new(technical.has_robots_txt, 5),
            ScoreRule::new(technical.has_viewport, 10),
            ScoreRule::new(technical.images_without_alt == 0, 5),
            ScoreRule::new((30..=60).contains(&technical.title_length), 5),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_score_clamps() {
        assert_eq!(
            reduce_score(0, &[ScoreRule::new(true, 60), ScoreRule::new(true, 60)]),
            100
        );
        assert_eq!(reduce_score(100, &[ScoreRule::new(true, -150)]), 0);
        assert_eq!(
            reduce_score(100, &[ScoreRule::new(false, -20), ScoreRule::new(true, -15)]),
            85
        );
        assert_eq!(reduce_score(0, &[]), 0);
    }

    #[test]
    fn test_overall_weighting() {
        let scores = CategoryScores {
            seo: 80,
            performance: 70,
            security: 25,
            accessibility: 90,
            social: 40,
            geo: 33,
        };
        // 20 + 14 + 2.5 + 13.5 + 6 + 4.95 = 60.95
        assert_eq!(scores.overall(), 61);

        let perfect = CategoryScores {
            seo: 100,
            performance: 100,
            security: 100,
            accessibility: 100,
            social: 100,
            geo: 100,
        };
        assert_eq!(perfect.overall(), 100);
        assert_eq!(CategoryScores::default().overall(), 0);
    }

    #[test]
    fn test_seo_checklist() {
        let mut technical = TechnicalSignals {
            title: Some("A title that is comfortably long enough".to_string()),
            title_length: 39,
            meta_description: Some("desc".to_string()),
            has_canonical: true,
            heading_hierarchy_valid: true,
            has_structured_data: true,
            has_sitemap: true,
            has_robots_txt: true,
            has_viewport: true,
            ..Default::default()
        };
        technical.headings.h1 = 1;
        assert_eq!(seo_score(&technical), 100);

        technical.headings.h1 = 2;
        technical.title_length = 70;
        assert_eq!(seo_score(&technical), 85);

        assert_eq!(seo_score(&TechnicalSignals::default()), 5);
    }
}
