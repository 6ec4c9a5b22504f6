use super::SignalExtractor;
use crate::components::scoring_engine::{reduce_score, ScoreRule};
use crate::domain_utils::DomainUtils;
use crate::markup::ParsedPage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Known platforms and the hosts that identify them.
const SOCIAL_PLATFORMS: &[(&str, &[&str])] = &[
    ("facebook", &["facebook.com", "fb.com", "fb.me"]),
    ("instagram", &["instagram.com"]),
    ("linkedin", &["linkedin.com"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("youtube", &["youtube.com", "youtu.be"]),
    ("tiktok", &["tiktok.com"]),
];

const SOCIAL_LINK_POINTS_CAP: f64 = 20.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSignals {
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_type: Option<String>,
    pub og_url: Option<String>,
    pub og_site_name: Option<String>,
    pub twitter_card: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_image: Option<String>,
    /// Platform name -> first profile link found for it.
    pub social_links: BTreeMap<String, String>,
    pub score: u8,
}

impl SocialSignals {
    pub fn has_complete_open_graph(&self) -> bool {
        self.og_title.is_some() && self.og_description.is_some() && self.og_image.is_some()
    }

    pub fn og_image_is_absolute(&self) -> bool {
        self.og_image
            .as_deref()
            .map(|image| {
                let lower = image.to_ascii_lowercase();
                lower.starts_with("https://") || lower.starts_with("http://")
            })
            .unwrap_or(false)
    }
}

pub struct SocialAnalyzer;

impl Default for SocialAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SocialAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn find_social_links(&self, page: &ParsedPage) -> BTreeMap<String, String> {
        let mut links = BTreeMap::new();

        for anchor in page.select("a[href]") {
            let href = match ParsedPage::attr(&anchor, "href") {
                Some(href) => href.trim(),
                None => continue,
            };
            let host = match DomainUtils::domain_of(href) {
                Some(host) => host,
                None => continue,
            };

            for (platform, hosts) in SOCIAL_PLATFORMS {
                if DomainUtils::matches_domain_list(&host, hosts) {
                    links
                        .entry(platform.to_string())
                        .or_insert_with(|| href.to_string());
                    break;
                }
            }
        }

        links
    }

    pub fn score(signals: &SocialSignals) -> u8 {
        let link_points = (signals.social_links.len() as f64 * SOCIAL_LINK_POINTS_CAP
            / SOCIAL_PLATFORMS.len() as f64)
            .round()
            .min(SOCIAL_LINK_POINTS_CAP) as i32;

        reduce_score(
            0,
            &[
                ScoreRule::new(signals.og_title.is_some(), 15),
                ScoreRule::new(signals.og_description.is_some(), 15),
                ScoreRule::new(signals.og_image.is_some(), 15),
                ScoreRule::new(signals.twitter_card.is_some(), 10),
                ScoreRule::new(signals.og_type.is_some(), 5),
                ScoreRule::new(signals.og_url.is_some(), 5),
                ScoreRule::new(signals.twitter_image.is_some(), 5),
                ScoreRule::new(true, link_points),
                ScoreRule::new(signals.og_image_is_absolute(), 10),
            ],
        )
    }
}

impl SignalExtractor for SocialAnalyzer {
    type Signals = SocialSignals;

    fn name(&self) -> &str {
        "OpenGraph"
    }

    fn extract(&self, page: &ParsedPage) -> SocialSignals {
        let mut signals = SocialSignals {
            og_title: page.meta_content("og:title"),
            og_description: page.meta_content("og:description"),
            og_image: page.meta_content("og:image"),
            og_type: page.meta_content("og:type"),
            og_url: page.meta_content("og:url"),
            og_site_name: page.meta_content("og:site_name"),
            twitter_card: page.meta_content("twitter:card"),
            twitter_title: page.meta_content("twitter:title"),
            twitter_image: page.meta_content("twitter:image"),
            social_links: self.find_social_links(page),
            score: 0,
        };
        signals.score = Self::score(&signals);
        signals
    }
}
