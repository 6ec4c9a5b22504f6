//! Static performance estimate. Counts resources declared in the markup and
//! reads the compression/caching headers; nothing is downloaded or timed.

use super::SignalExtractor;
use crate::components::scoring_engine::{reduce_score, ScoreRule};
use crate::markup::ParsedPage;
use serde::{Deserialize, Serialize};

const SCRIPT_WEIGHT_KB: f64 = 50.0;
const STYLESHEET_WEIGHT_KB: f64 = 30.0;
const IMAGE_WEIGHT_KB: f64 = 100.0;
const LARGE_IMAGE_PX: u32 = 1000;

const COMPRESSION_ENCODINGS: [&str; 5] = ["gzip", "br", "deflate", "zstd", "compress"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSignals {
    pub script_count: usize,
    pub stylesheet_count: usize,
    pub image_count: usize,
    pub total_resources: usize,
    pub html_size_kb: f64,
    pub estimated_size_kb: f64,
    pub has_compression: bool,
    pub has_caching: bool,
    pub large_images: usize,
    pub score: u8,
}

pub struct PerformanceAnalyzer;

impl Default for PerformanceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn count_stylesheets(&self, page: &ParsedPage) -> usize {
        page.select("link[rel][href]")
            .iter()
            .filter(|link| {
                ParsedPage::attr(link, "rel")
                    .map(|rel| {
                        rel.split_whitespace()
                            .any(|r| r.eq_ignore_ascii_case("stylesheet"))
                    })
                    .unwrap_or(false)
            })
            .count()
    }

    fn count_large_images(&self, page: &ParsedPage) -> usize {
        page.select("img")
            .iter()
            .filter(|img| {
                ["width", "height"].iter().any(|dimension| {
                    ParsedPage::attr(img, dimension)
                        .and_then(parse_pixels)
                        .map(|px| px > LARGE_IMAGE_PX)
                        .unwrap_or(false)
                })
            })
            .count()
    }

    pub fn score(signals: &PerformanceSignals) -> u8 {
        let resources = signals.total_resources;
        let size = signals.estimated_size_kb;
        let large = signals.large_images;

        reduce_score(
            100,
            &[
                ScoreRule::new(resources > 50, -20),
                ScoreRule::new(resources > 30 && resources <= 50, -10),
                ScoreRule::new(size > 3000.0, -30),
                ScoreRule::new(size > 2000.0 && size <= 3000.0, -20),
                ScoreRule::new(size > 1000.0 && size <= 2000.0, -10),
                ScoreRule::new(!signals.has_compression, -15),
                ScoreRule::new(!signals.has_caching, -10),
                ScoreRule::new(large > 5, -15),
                ScoreRule::new(large > 0 && large <= 5, -5),
            ],
        )
    }
}

impl SignalExtractor for PerformanceAnalyzer {
    type Signals = PerformanceSignals;

    fn name(&self) -> &str {
        "Performance"
    }

    fn extract(&self, page: &ParsedPage) -> PerformanceSignals {
        let headers = page.headers();
        let script_count = page.count("script[src]");
        let stylesheet_count = self.count_stylesheets(page);
        let image_count = page.count("img[src]");

        let html_size_kb = page.html().len() as f64 / 1024.0;
        let estimated_size_kb = html_size_kb
            + script_count as f64 * SCRIPT_WEIGHT_KB
            + stylesheet_count as f64 * STYLESHEET_WEIGHT_KB
            + image_count as f64 * IMAGE_WEIGHT_KB;

        let has_compression = headers
            .get("content-encoding")
            .map(|encoding| {
                let encoding = encoding.to_ascii_lowercase();
                COMPRESSION_ENCODINGS.iter().any(|e| encoding.contains(e))
            })
            .unwrap_or(false);

        let has_caching = headers
            .get("cache-control")
            .map(|value| !value.to_ascii_lowercase().contains("no-store"))
            .unwrap_or(false)
            || headers.contains("expires")
            || headers.contains("etag")
            || headers.contains("last-modified");

        let mut signals = PerformanceSignals {
            script_count,
            stylesheet_count,
            image_count,
            total_resources: script_count + stylesheet_count + image_count,
            html_size_kb: super::round2(html_size_kb),
            estimated_size_kb: super::round2(estimated_size_kb),
            has_compression,
            has_caching,
            large_images: self.count_large_images(page),
            score: 0,
        };
        signals.score = Self::score(&signals);
        signals
    }
}

/// Parse a declared dimension such as `1200`, `1200px` or `1200.5`.
fn parse_pixels(value: &str) -> Option<u32> {
    let digits = value.trim().trim_end_matches("px").trim();
    match digits.parse::<f64>() {
        Ok(px) if px.is_finite() && px >= 0.0 => Some(px as u32),
        _ => {
            log::debug!("Ignoring unparsable image dimension '{}'", value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchResult, SiteProbes};
    use crate::markup::ResponseHeaders;

    fn analyze(html: &str, headers: ResponseHeaders) -> PerformanceSignals {
        let fetch = FetchResult::from_markup("https://example.com/", html, headers);
        let page = ParsedPage::parse(&fetch, SiteProbes::default());
        PerformanceAnalyzer::new().extract(&page)
    }

    #[test]
    fn test_parse_pixels() {
        assert_eq!(parse_pixels("1200"), Some(1200));
        assert_eq!(parse_pixels(" 800px "), Some(800));
        assert_eq!(parse_pixels("100%"), None);
        assert_eq!(parse_pixels("auto"), None);
    }

    #[test]
    fn test_lean_page_with_good_headers() {
        let headers: ResponseHeaders = [
            ("content-encoding", "gzip"),
            ("cache-control", "public, max-age=600"),
        ]
        .into_iter()
        .collect();
        let html = r#"<html><head><link rel="stylesheet" href="a.css">
            <script src="a.js"></script></head>
            <body><img src="a.jpg" width="400"></body></html>"#;

        let signals = analyze(html, headers);
        assert_eq!(signals.script_count, 1);
        assert_eq!(signals.stylesheet_count, 1);
        assert_eq!(signals.image_count, 1);
        assert!(signals.has_compression);
        assert!(signals.has_caching);
        assert_eq!(signals.large_images, 0);
        let size = signals.estimated_size_kb;
        assert!(size > 180.0 && size < 181.0, "size {}", size);
        assert_eq!(signals.score, 100);
    }

    #[test]
    fn test_heavy_page_penalties() {
        let mut html = String::from("<html><body>");
        for i in 0..12 {
            html.push_str(&format!(r#"<script src="s{}.js"></script>"#, i));
        }
        for i in 0..25 {
            html.push_str(&format!(r#"<img src="i{}.jpg" width="1600">"#, i));
        }
        html.push_str("</body></html>");

        let signals = analyze(&html, ResponseHeaders::new());
        assert_eq!(signals.total_resources, 37);
        // 600 + 2500 KB of resources plus the markup itself
        assert!(signals.estimated_size_kb > 3000.0);
        assert_eq!(signals.large_images, 25);
        // -10 resources, -30 size, -15 compression, -10 caching, -15 large images
        assert_eq!(signals.score, 20);
    }

    #[test]
    fn test_score_bands() {
        let base = PerformanceSignals {
            has_compression: true,
            has_caching: true,
            ..Default::default()
        };
        assert_eq!(PerformanceAnalyzer::score(&base), 100);

        let medium = PerformanceSignals {
            total_resources: 55,
            estimated_size_kb: 1500.0,
            large_images: 2,
            ..base.clone()
        };
        assert_eq!(PerformanceAnalyzer::score(&medium), 65);

        let worst = PerformanceSignals {
            total_resources: 80,
            estimated_size_kb: 5000.0,
            large_images: 9,
            has_compression: false,
            has_caching: false,
            ..Default::default()
        };
        assert_eq!(PerformanceAnalyzer::score(&worst), 10);
    }

    #[test]
    fn test_no_store_is_not_caching() {
        let headers: ResponseHeaders = [("cache-control", "no-store")].into_iter().collect();
        let signals = analyze("<html></html>", headers);
        assert!(!signals.has_caching);
    }
}
