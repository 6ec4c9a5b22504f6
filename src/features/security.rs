use super::SignalExtractor;
use crate::components::scoring_engine::{reduce_score, ScoreRule};
use crate::markup::ParsedPage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Security headers checked for presence, with the deduction for each missing one.
pub const SECURITY_HEADERS: [(&str, i32); 5] = [
    ("strict-transport-security", 20),
    ("content-security-policy", 20),
    ("x-frame-options", 15),
    ("x-content-type-options", 10),
    ("referrer-policy", 10),
];

static INSECURE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)http://(\[[^\]\s"'<>]*\]|[^\s"'<>/:\[]+)"#).unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySignals {
    pub has_hsts: bool,
    pub has_csp: bool,
    pub has_x_frame_options: bool,
    pub has_x_content_type_options: bool,
    pub has_referrer_policy: bool,
    pub missing_headers: Vec<String>,
    pub score: u8,
    pub has_mixed_content: bool,
    pub https_redirect: bool,
}

pub struct SecurityAnalyzer;

impl Default for SecurityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// An https page referencing any non-local `http://` resource.
    pub fn detect_mixed_content(&self, is_https: bool, html: &str) -> bool {
        if !is_https {
            return false;
        }

        INSECURE_REFERENCE.captures_iter(html).any(|cap| {
            let host = cap
                .get(1)
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            !matches!(host.as_str(), "localhost" | "127.0.0.1" | "0.0.0.0" | "[::1]")
        })
    }
}

impl SignalExtractor for SecurityAnalyzer {
    type Signals = SecuritySignals;

    fn name(&self) -> &str {
        "Security"
    }

    fn extract(&self, page: &ParsedPage) -> SecuritySignals {
        let headers = page.headers();
        let present: Vec<bool> = SECURITY_HEADERS
            .iter()
            .map(|(name, _)| headers.contains(name))
            .collect();

        let missing_headers = SECURITY_HEADERS
            .iter()
            .zip(&present)
            .filter(|(_, found)| !**found)
            .map(|((name, _), _)| name.to_string())
            .collect();

        let score = if headers.is_empty() {
            log::warn!("No response headers captured for {}", page.url());
            0
        } else {
            let rules: Vec<ScoreRule> = SECURITY_HEADERS
                .iter()
                .zip(&present)
                .map(|((_, penalty), found)| ScoreRule::new(!found, -penalty))
                .collect();
            reduce_score(100, &rules)
        };

        SecuritySignals {
            has_hsts: present[0],
            has_csp: present[1],
            has_x_frame_options: present[2],
            has_x_content_type_options: present[3],
            has_referrer_policy: present[4],
            missing_headers,
            score,
            has_mixed_content: self.detect_mixed_content(page.is_https(), page.html()),
            https_redirect: page.is_https(),
        }
    }
}
