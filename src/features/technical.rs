//! Technical/SEO signal extraction: title and description, headings, images,
//! links, indexing hints, keyword density, structured data and text ratio.

use super::{percentage, round2, SignalExtractor};
use crate::domain_utils::{DomainUtils, LinkTarget};
use crate::markup::ParsedPage;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

const KEYWORD_MIN_CHARS: usize = 4;
const TOP_KEYWORDS: usize = 10;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // English
        "about", "above", "after", "again", "against", "also", "been", "before", "being",
        "below", "between", "both", "cannot", "could", "does", "doing", "down", "during",
        "each", "from", "further", "have", "having", "here", "hers", "herself", "himself",
        "into", "itself", "just", "more", "most", "myself", "once", "only", "other", "ours",
        "ourselves", "over", "same", "should", "some", "such", "than", "that", "their",
        "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
        "through", "under", "until", "very", "were", "what", "when", "where", "which",
        "while", "whom", "will", "with", "would", "your", "yours", "yourself", "yourselves",
        // Czech
        "ale", "aby", "jako", "jsem", "jsme", "jste", "jsou", "byla", "bylo", "byli", "bude",
        "budou", "které", "který", "která", "kteří", "jejich", "jeho", "její", "nebo",
        "proto", "také", "tedy", "pouze", "přes", "před", "podle", "pokud", "protože",
        "mezi", "může", "můžete", "však", "této", "tento", "tato", "toto", "tyto", "vás",
        "váš", "vaše", "naše", "náš", "nás", "když", "kde", "jak", "již", "ještě", "stále",
        "velmi", "více", "bez", "pod", "nad", "při", "jen", "své", "svůj", "svou", "sebe",
        "mají", "máme", "máte", "není", "nejsou", "zde", "tak", "tím", "toho", "tomu",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensity {
    pub word: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSignals {
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub headings: HeadingCounts,
    pub heading_order: Vec<u8>,
    pub heading_hierarchy_valid: bool,
    pub images_total: usize,
    pub images_with_alt: usize,
    pub images_without_alt: usize,
    /// Percentage of images carrying an `alt` attribute; 100 when there are none.
    pub alt_coverage: f64,
    pub internal_links: usize,
    pub external_links: usize,
    pub canonical_url: Option<String>,
    pub has_canonical: bool,
    pub hreflang: Vec<String>,
    pub has_hreflang: bool,
    pub robots_meta: Option<String>,
    pub has_robots_meta: bool,
    pub has_viewport: bool,
    pub has_sitemap: bool,
    pub has_robots_txt: bool,
    pub keyword_density: Vec<KeywordDensity>,
    pub structured_data_types: Vec<String>,
    pub has_structured_data: bool,
    pub text_html_ratio: f64,
}

pub struct TechnicalAnalyzer;

impl Default for TechnicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnicalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn extract_title(&self, page: &ParsedPage) -> Option<String> {
        page.select_first("head title")
            .or_else(|| page.select_first("title"))
            .map(|el| ParsedPage::text(&el))
            .filter(|title| !title.is_empty())
    }

    fn extract_headings(&self, page: &ParsedPage) -> (HeadingCounts, Vec<u8>) {
        let mut counts = HeadingCounts::default();
        let order = heading_levels(page);

        for &level in &order {
            match level {
                1 => counts.h1 += 1,
                2 => counts.h2 += 1,
                3 => counts.h3 += 1,
                4 => counts.h4 += 1,
                5 => counts.h5 += 1,
                _ => counts.h6 += 1,
            }
        }

        (counts, order)
    }

    fn count_links(&self, page: &ParsedPage) -> (usize, usize) {
        let base = match page.base_url() {
            Some(base) => base,
            None => return (0, 0),
        };

        let mut internal = 0;
        let mut external = 0;
        for link in page.select("a[href]") {
            let href = ParsedPage::attr(&link, "href").unwrap_or("");
            match DomainUtils::classify_link(base, href) {
                LinkTarget::Internal => internal += 1,
                LinkTarget::External => external += 1,
                LinkTarget::NonNavigational => {}
            }
        }

        (internal, external)
    }

    fn extract_hreflang(&self, page: &ParsedPage) -> Vec<String> {
        let mut languages = Vec::new();
        for link in page.select("link[hreflang]") {
            if let Some(lang) = ParsedPage::attr(&link, "hreflang") {
                let lang = lang.trim().to_string();
                if !lang.is_empty() && !languages.contains(&lang) {
                    languages.push(lang);
                }
            }
        }
        languages
    }

    fn extract_canonical(&self, page: &ParsedPage) -> Option<String> {
        page.select("link[rel][href]").into_iter().find_map(|link| {
            let is_canonical = ParsedPage::attr(&link, "rel")
                .map(|rel| {
                    rel.split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("canonical"))
                })
                .unwrap_or(false);
            if !is_canonical {
                return None;
            }
            ParsedPage::attr(&link, "href")
                .map(|href| href.trim().to_string())
                .filter(|href| !href.is_empty())
        })
    }
}

impl SignalExtractor for TechnicalAnalyzer {
    type Signals = TechnicalSignals;

    fn name(&self) -> &str {
        "TechnicalSeo"
    }

    fn extract(&self, page: &ParsedPage) -> TechnicalSignals {
        let title = self.extract_title(page);
        let meta_description = page.meta_content("description");
        let (headings, heading_order) = self.extract_headings(page);

        let images = page.select("img");
        let images_with_alt = images
            .iter()
            .filter(|img| ParsedPage::attr(img, "alt").is_some())
            .count();
        let alt_coverage = if images.is_empty() {
            100.0
        } else {
            percentage(images_with_alt, images.len())
        };

        let (internal_links, external_links) = self.count_links(page);
        let canonical_url = self.extract_canonical(page);
        let hreflang = self.extract_hreflang(page);
        let robots_meta = page.meta_content("robots");
        let structured_data_types = schema_types(page.json_ld());
        let probes = page.probes();

        TechnicalSignals {
            title_length: title.as_ref().map(|t| t.chars().count()).unwrap_or(0),
            title,
            meta_description_length: meta_description
                .as_ref()
                .map(|d| d.chars().count())
                .unwrap_or(0),
            meta_description,
            heading_hierarchy_valid: is_valid_heading_hierarchy(&heading_order),
            headings,
            heading_order,
            images_total: images.len(),
            images_with_alt,
            images_without_alt: images.len() - images_with_alt,
            alt_coverage,
            internal_links,
            external_links,
            has_canonical: canonical_url.is_some(),
            canonical_url,
            has_hreflang: !hreflang.is_empty(),
            hreflang,
            has_robots_meta: robots_meta.is_some(),
            robots_meta,
            has_viewport: page.meta_content("viewport").is_some(),
            has_sitemap: probes.sitemap,
            has_robots_txt: probes.robots_txt,
            keyword_density: keyword_density(page.visible_text(), TOP_KEYWORDS),
            has_structured_data: !structured_data_types.is_empty(),
            structured_data_types,
            text_html_ratio: text_html_ratio(page.visible_text(), page.html()),
        }
    }
}

/// Heading levels (1..=6) in document order.
pub fn heading_levels(page: &ParsedPage) -> Vec<u8> {
    page.select("h1, h2, h3, h4, h5, h6")
        .iter()
        .filter_map(|heading| {
            heading
                .value()
                .name()
                .trim_start_matches(['h', 'H'])
                .parse::<u8>()
                .ok()
                .filter(|level| (1..=6).contains(level))
        })
        .collect()
}

/// Headings must open at level 1 and may only ever step one level deeper at a
/// time. Going back up is unrestricted. No headings at all is valid.
pub fn is_valid_heading_hierarchy(levels: &[u8]) -> bool {
    match levels.first() {
        None => true,
        Some(&first) if first != 1 => false,
        Some(_) => levels.windows(2).all(|pair| pair[1] <= pair[0] + 1),
    }
}

/// Top `limit` words of at least four letters, stop words removed, with their
/// share of all such words. Sorted by count, then alphabetically.
pub fn keyword_density(text: &str, limit: usize) -> Vec<KeywordDensity> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() >= KEYWORD_MIN_CHARS)
        .map(|w| w.to_lowercase())
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
        .collect();

    if words.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in &words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, count)| KeywordDensity {
            word: word.to_string(),
            count,
            // Truncated to hundredths so the shares never sum past 100%.
            percentage: (count * 10_000 / words.len()) as f64 / 100.0,
        })
        .collect()
}

/// De-duplicated schema.org types found anywhere inside the JSON-LD blocks,
/// including `@graph` members and nested entities, in first-seen order.
pub fn schema_types(blocks: &[Value]) -> Vec<String> {
    let mut types = Vec::new();
    for block in blocks {
        collect_types(block, &mut types);
    }
    types
}

fn collect_types(value: &Value, types: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => push_type(t, types),
                Some(Value::Array(items)) => {
                    for item in items {
                        if let Value::String(t) = item {
                            push_type(t, types);
                        }
                    }
                }
                _ => {}
            }
            for (key, child) in map {
                if key != "@type" {
                    collect_types(child, types);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_types(item, types);
            }
        }
        _ => {}
    }
}

fn push_type(raw: &str, types: &mut Vec<String>) {
    let name = raw
        .trim()
        .trim_start_matches("http://schema.org/")
        .trim_start_matches("https://schema.org/");
    if !name.is_empty() && !types.iter().any(|t| t == name) {
        types.push(name.to_string());
    }
}

pub fn text_html_ratio(visible_text: &str, html: &str) -> f64 {
    if html.is_empty() {
        return 0.0;
    }
    round2(visible_text.len() as f64 / html.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchResult, SiteProbes};
    use crate::markup::ResponseHeaders;
    use serde_json::json;

    fn extract(html: &str, probes: SiteProbes) -> TechnicalSignals {
        let fetch =
            FetchResult::from_markup("https://www.example.com/", html, ResponseHeaders::new());
        let page = ParsedPage::parse(&fetch, probes);
        TechnicalAnalyzer::new().extract(&page)
    }

    #[test]
    fn test_heading_hierarchy() {
        assert!(is_valid_heading_hierarchy(&[1, 2, 3]));
        assert!(!is_valid_heading_hierarchy(&[1, 3]));
        assert!(!is_valid_heading_hierarchy(&[2, 3]));
        assert!(is_valid_heading_hierarchy(&[]));
        assert!(is_valid_heading_hierarchy(&[1, 2, 3, 2, 1, 2]));
        assert!(is_valid_heading_hierarchy(&[1, 2, 3, 4, 2]));
    }

    #[test]
    fn test_keyword_density_counts() {
        let text = "Marketing agency helps marketing teams. The agency loves marketing and data.";
        let keywords = keyword_density(text, 10);

        // 9 words of 4+ letters: marketing x3, agency x2, data, helps, loves, teams
        assert_eq!(keywords[0].word, "marketing");
        assert_eq!(keywords[0].count, 3);
        assert_eq!(keywords[0].percentage, 33.33);
        assert_eq!(keywords[1].word, "agency");
        assert_eq!(keywords[1].count, 2);
        assert_eq!(keywords[1].percentage, 22.22);
        assert_eq!(keywords[2].word, "data");
        assert_eq!(keywords.len(), 6);

        let total: f64 = keywords.iter().map(|k| k.percentage).sum();
        assert!(total <= 100.0);
    }

    #[test]
    fn test_keyword_density_shares_never_exceed_whole() {
        let keywords = keyword_density("alpha bravo charlie delta echoes foxtrot", 10);

        assert_eq!(keywords.len(), 6);
        assert!(keywords.iter().all(|k| k.percentage == 16.66));
        let total: f64 = keywords.iter().map(|k| k.percentage).sum();
        assert!(total <= 100.0, "total {}", total);
    }

    #[test]
    fn test_keyword_density_drops_stop_words_and_short_words() {
        let keywords = keyword_density("this that with které jsou cat dog", 10);
        assert!(keywords.is_empty());

        let keywords = keyword_density("Služby služby SLUŽBY", 10);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].word, "služby");
        assert_eq!(keywords[0].count, 3);
    }

    #[test]
    fn test_keyword_density_top_ten() {
        let text = "alpha beta gamma delta epsilon zeta theta iota kappa lambda sigma omega alpha";
        let keywords = keyword_density(text, 10);

        assert_eq!(keywords.len(), 10);
        assert_eq!(keywords[0].word, "alpha");
        assert_eq!(keywords[0].count, 2);
        assert_eq!(keywords[0].percentage, 15.38);

        let total: f64 = keywords.iter().map(|k| k.percentage).sum();
        assert!(total <= 100.0);
    }

    #[test]
    fn test_schema_types_walks_graph_and_nesting() {
        let blocks = vec![
            json!({
                "@context": "https://schema.org",
                "@graph": [
                    {"@type": "WebSite", "publisher": {"@type": "Organization",
                        "address": {"@type": "PostalAddress"}}},
                    {"@type": ["LocalBusiness", "Organization"]},
                    {"@type": "BreadcrumbList", "itemListElement": [{"@type": "ListItem"}]}
                ]
            }),
            json!({"@type": "https://schema.org/Product"}),
        ];

        let types = schema_types(&blocks);
        assert_eq!(
            types,
            vec![
                "WebSite",
                "Organization",
                "PostalAddress",
                "LocalBusiness",
                "BreadcrumbList",
                "ListItem",
                "Product"
            ]
        );
    }

    #[test]
    fn test_text_html_ratio() {
        assert_eq!(text_html_ratio("abcde", "0123456789"), 50.0);
        assert_eq!(text_html_ratio("", ""), 0.0);
        assert_eq!(text_html_ratio("a", "abc"), 33.33);
    }

    #[test]
    fn test_extract_full_page() {
        let html = r##"<!DOCTYPE html><html lang="en"><head>
            <title>Acme Roofing | Reliable roof repair in Brno</title>
            <meta name="description" content="Roof repair and replacement.">
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <meta name="robots" content="index,follow">
            <link rel="canonical" href="https://example.com/">
            <link rel="alternate" hreflang="cs" href="https://example.com/cs/">
            <link rel="alternate" hreflang="en" href="https://example.com/en/">
            <script type="application/ld+json">{"@type":"RoofingContractor"}</script>
            </head><body>
            <h1>Roofing</h1><h2>Repairs</h2><h3>Tiles</h3><h2>Contact</h2>
            <img src="a.jpg" alt="Roof"><img src="b.jpg" alt=""><img src="c.jpg">
            <a href="/about">About</a><a href="https://example.com/x">X</a>
            <a href="https://facebook.com/acme">FB</a><a href="#top">Top</a>
            </body></html>"##;

        let signals = extract(
            html,
            SiteProbes {
                sitemap: true,
                robots_txt: false,
            },
        );

        assert_eq!(
            signals.title.as_deref(),
            Some("Acme Roofing | Reliable roof repair in Brno")
        );
        assert_eq!(signals.title_length, 43);
        assert_eq!(signals.meta_description_length, 28);
        assert_eq!(signals.headings.h1, 1);
        assert_eq!(signals.headings.h2, 2);
        assert_eq!(signals.heading_order, vec![1, 2, 3, 2]);
        assert!(signals.heading_hierarchy_valid);
        assert_eq!(signals.images_total, 3);
        assert_eq!(signals.images_with_alt, 2);
        assert_eq!(signals.images_without_alt, 1);
        assert_eq!(signals.alt_coverage, 66.67);
        assert_eq!(signals.internal_links, 2);
        assert_eq!(signals.external_links, 1);
        assert!(signals.has_canonical);
        assert_eq!(signals.hreflang, vec!["cs", "en"]);
        assert_eq!(signals.robots_meta.as_deref(), Some("index,follow"));
        assert!(signals.has_viewport);
        assert!(signals.has_sitemap);
        assert!(!signals.has_robots_txt);
        assert_eq!(signals.structured_data_types, vec!["RoofingContractor"]);
        assert!(signals.text_html_ratio > 0.0);
    }

    #[test]
    fn test_extract_empty_page() {
        let signals = extract("", SiteProbes::default());
        assert!(signals.title.is_none());
        assert_eq!(signals.images_total, 0);
        assert_eq!(signals.alt_coverage, 100.0);
        assert!(signals.heading_hierarchy_valid);
        assert!(signals.keyword_density.is_empty());
        assert!(!signals.has_structured_data);
    }
}
