//! GEO/AIEO readiness: signals that help answer engines and local search cite
//! the page (FAQ content, schema.org entities, business details, freshness).

use super::technical::schema_types;
use super::SignalExtractor;
use crate::components::scoring_engine::{reduce_score, ScoreRule};
use crate::markup::ParsedPage;
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const LOCAL_BUSINESS_TYPES: [&str; 13] = [
    "LocalBusiness",
    "Restaurant",
    "Store",
    "Dentist",
    "AutoRepair",
    "LegalService",
    "MedicalBusiness",
    "HomeAndConstructionBusiness",
    "ProfessionalService",
    "HealthAndBeautyBusiness",
    "FoodEstablishment",
    "LodgingBusiness",
    "RealEstateAgent",
];

const FAQ_SCHEMA_TYPES: [&str; 2] = ["FAQPage", "QAPage"];

const HOURS_KEYWORDS: [&str; 6] = [
    "opening hours",
    "business hours",
    "open hours",
    "otevírací doba",
    "provozní doba",
    "mon-fri",
];
const PRICING_KEYWORDS: [&str; 5] = ["pricing", "price list", "prices", "ceník", "our rates"];

const ABOUT_MARKERS: [&str; 4] = ["about", "o-nas", "o-mne", "o nás"];
const CONTACT_MARKERS: [&str; 2] = ["contact", "kontakt"];

static COPYRIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:©|&copy;|copyright)\s*(?:(\d{4})\s*[-–]\s*)?(\d{4})").unwrap()
});
static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{3} ?\d{2}|\d{5}(?:-\d{4})?|[A-Z]{1,2}\d[A-Z\d]? ?\d[A-Z]{2})\b").unwrap()
});
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{3,4}\b").unwrap()
});
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSignals {
    pub has_faq: bool,
    pub schema_types: Vec<String>,
    pub has_local_business: bool,
    pub has_organization: bool,
    pub has_product: bool,
    pub has_breadcrumb: bool,
    pub has_address: bool,
    pub has_phone: bool,
    pub has_email: bool,
    pub has_opening_hours: bool,
    pub has_pricing: bool,
    /// First `tel:` link target on the page.
    pub phone: Option<String>,
    /// First `mailto:` link target on the page.
    pub email: Option<String>,
    pub copyright_year: Option<i32>,
    pub has_fresh_copyright: bool,
    pub has_date_published: bool,
    pub latest_date: Option<String>,
    pub has_about_page: bool,
    pub has_contact_page: bool,
    pub score: u8,
}

pub struct GeoAnalyzer {
    reference_year: i32,
}

impl Default for GeoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoAnalyzer {
    pub fn new() -> Self {
        Self::with_reference_year(chrono::Utc::now().year())
    }

    /// Judge copyright freshness against a fixed year instead of the clock.
    pub fn with_reference_year(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Latest year in any copyright notice of the raw markup.
    pub fn copyright_year(&self, html: &str) -> Option<i32> {
        COPYRIGHT
            .captures_iter(html)
            .flat_map(|cap| {
                [cap.get(1), cap.get(2)]
                    .into_iter()
                    .flatten()
                    .filter_map(|m| m.as_str().parse::<i32>().ok())
                    .collect::<Vec<_>>()
            })
            .max()
    }

    fn detect_faq(&self, page: &ParsedPage, types: &[String]) -> bool {
        if types.iter().any(|t| FAQ_SCHEMA_TYPES.contains(&t.as_str())) {
            return true;
        }
        if page.count("details summary") > 0 {
            return true;
        }

        page.select("[class], [id]").iter().any(|el| {
            ["class", "id"].iter().any(|attr| {
                ParsedPage::attr(el, attr)
                    .map(|value| value.to_ascii_lowercase().contains("faq"))
                    .unwrap_or(false)
            })
        })
    }

    fn first_link_target(&self, page: &ParsedPage, scheme: &str) -> Option<String> {
        page.select("a[href]").iter().find_map(|link| {
            let href = ParsedPage::attr(link, "href")?.trim();
            if !href.get(..scheme.len())?.eq_ignore_ascii_case(scheme) {
                return None;
            }
            let target = href[scheme.len()..].split('?').next().unwrap_or("").trim();
            (!target.is_empty()).then(|| target.to_string())
        })
    }

    fn has_itemprop(&self, page: &ParsedPage, props: &[&str]) -> bool {
        page.select("[itemprop]").iter().any(|el| {
            ParsedPage::attr(el, "itemprop")
                .map(|value| {
                    value
                        .split_whitespace()
                        .any(|prop| props.iter().any(|p| prop.eq_ignore_ascii_case(p)))
                })
                .unwrap_or(false)
        })
    }

    fn links_to(&self, page: &ParsedPage, markers: &[&str]) -> bool {
        page.select("a[href]").iter().any(|link| {
            let href = ParsedPage::attr(link, "href")
                .unwrap_or("")
                .to_lowercase();
            let text = ParsedPage::text(link).to_lowercase();
            markers
                .iter()
                .any(|marker| href.contains(marker) || text.contains(marker))
        })
    }

    fn latest_date(&self, page: &ParsedPage) -> Option<String> {
        // ISO 8601 values order correctly as strings.
        page.select("time[datetime]")
            .iter()
            .filter_map(|time| ParsedPage::attr(time, "datetime"))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .max()
    }

    pub fn score(signals: &GeoSignals) -> u8 {
        let any_schema = !signals.schema_types.is_empty();

        reduce_score(
            0,
            &[
                ScoreRule::new(signals.has_faq, 15),
                ScoreRule::new(signals.has_local_business, 15),
                ScoreRule::new(!signals.has_local_business && any_schema, 10),
                ScoreRule::new(signals.has_address, 8),
                ScoreRule::new(signals.has_phone, 5),
                ScoreRule::new(signals.has_email, 5),
                ScoreRule::new(signals.has_opening_hours, 5),
                ScoreRule::new(signals.has_pricing, 5),
                ScoreRule::new(signals.has_fresh_copyright, 10),
                ScoreRule::new(!signals.has_fresh_copyright && signals.has_date_published, 5),
                ScoreRule::new(signals.has_about_page, 5),
                ScoreRule::new(signals.has_contact_page, 5),
                ScoreRule::new(signals.has_organization, 5),
                ScoreRule::new(signals.has_breadcrumb, 5),
                ScoreRule::new(signals.has_product, 5),
            ],
        )
    }
}

impl SignalExtractor for GeoAnalyzer {
    type Signals = GeoSignals;

    fn name(&self) -> &str {
        "Geo"
    }

    fn extract(&self, page: &ParsedPage) -> GeoSignals {
        let types = schema_types(page.json_ld());
        let has_type = |wanted: &[&str]| types.iter().any(|t| wanted.contains(&t.as_str()));

        let text = page.visible_text();
        let text_lower = text.to_lowercase();
        let html_lower = page.html_lower();

        let phone = self.first_link_target(page, "tel:");
        let email = self.first_link_target(page, "mailto:");

        let has_address = page.count("address") > 0
            || self.has_itemprop(page, &["address", "streetAddress", "postalCode"])
            || has_type(&["PostalAddress"])
            || POSTAL_CODE.is_match(text);
        let has_phone = phone.is_some()
            || self.has_itemprop(page, &["telephone"])
            || PHONE.is_match(text);
        let has_email = email.is_some() || EMAIL.is_match(text);
        let has_opening_hours = self.has_itemprop(page, &["openingHours"])
            || html_lower.contains("openinghours")
            || HOURS_KEYWORDS.iter().any(|k| text_lower.contains(k));
        let has_pricing = self.has_itemprop(page, &["price", "priceRange"])
            || html_lower.contains("\"pricerange\"")
            || PRICING_KEYWORDS.iter().any(|k| text_lower.contains(k));

        let copyright_year = self.copyright_year(page.html());
        let has_fresh_copyright = copyright_year
            .map(|year| (0..=1).contains(&(self.reference_year - year)))
            .unwrap_or(false);
        let latest_date = self.latest_date(page);
        let has_date_published = html_lower.contains("datepublished") || latest_date.is_some();

        let mut signals = GeoSignals {
            has_faq: self.detect_faq(page, &types),
            has_local_business: has_type(&LOCAL_BUSINESS_TYPES),
            has_organization: has_type(&["Organization", "Corporation"]),
            has_product: has_type(&["Product"]),
            has_breadcrumb: has_type(&["BreadcrumbList"]),
            has_address,
            has_phone,
            has_email,
            has_opening_hours,
            has_pricing,
            phone,
            email,
            copyright_year,
            has_fresh_copyright,
            has_date_published,
            latest_date,
            has_about_page: self.links_to(page, &ABOUT_MARKERS),
            has_contact_page: self.links_to(page, &CONTACT_MARKERS),
            schema_types: types.clone(),
            score: 0,
        };
        signals.score = Self::score(&signals);

        log::debug!(
            "GEO signals for {}: faq={} local_business={} copyright={:?}",
            page.url(),
            signals.has_faq,
            signals.has_local_business,
            signals.copyright_year
        );

        signals
    }
}
