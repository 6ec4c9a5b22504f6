//! Best-effort technology fingerprinting from markup and response headers.
//!
//! Platform and framework are exclusive (first signature in table order wins);
//! libraries, analytics, fonts and CDNs are additive lists.

use super::SignalExtractor;
use crate::markup::ParsedPage;
use serde::{Deserialize, Serialize};

type Signatures = &'static [(&'static str, &'static [&'static str])];

const PLATFORMS: Signatures = &[
    ("WordPress", &["wp-content", "wp-includes", "wp-json"]),
    ("Shopify", &["cdn.shopify.com", "shopify.theme", "myshopify.com"]),
    ("Wix", &["static.wixstatic.com", "wix.com", "_wixcss"]),
    ("Squarespace", &["squarespace.com", "static1.squarespace"]),
    ("Webflow", &["webflow.js", "data-wf-page", "assets.website-files.com"]),
    ("Shoptet", &["cdn.myshoptet.com", "shoptet"]),
    ("Webnode", &["webnode"]),
    ("Joomla", &["/media/jui/", "joomla"]),
    ("Drupal", &["drupal-settings-json", "/sites/default/files", "drupal.js"]),
    ("PrestaShop", &["prestashop"]),
    ("Magento", &["mage/cookies", "magento"]),
    ("Ghost", &["ghost-portal", "content=\"ghost"]),
    ("HubSpot CMS", &["hs-scripts.com", "hubspot"]),
];

const FRAMEWORKS: Signatures = &[
    ("Next.js", &["/_next/", "__next_data__"]),
    ("Nuxt.js", &["/_nuxt/", "__nuxt"]),
    ("Gatsby", &["___gatsby", "gatsby-"]),
    ("Angular", &["ng-version", "ng-app"]),
    ("Svelte", &["svelte-", "__sveltekit"]),
    ("Astro", &["astro-island", "/_astro/"]),
    ("Vue.js", &["data-v-", "vue.js", "vue.min.js", "vue.global"]),
    ("React", &["data-reactroot", "react-dom", "react.production"]),
];

const LIBRARIES: Signatures = &[
    ("jQuery", &["jquery"]),
    ("Bootstrap", &["bootstrap.min.css", "bootstrap.min.js", "bootstrap.css", "bootstrap.bundle"]),
    ("Tailwind CSS", &["tailwindcss", "tailwind.min.css"]),
    ("Font Awesome", &["font-awesome", "fontawesome"]),
    ("Lodash", &["lodash"]),
    ("GSAP", &["gsap"]),
    ("Alpine.js", &["alpinejs", "x-data="]),
    ("Swiper", &["swiper"]),
    ("Slick", &["slick.min.js", "slick-carousel"]),
];

const ANALYTICS: Signatures = &[
    ("Google Analytics", &["google-analytics.com", "gtag(", "ga('create'"]),
    ("Google Tag Manager", &["googletagmanager.com"]),
    ("Meta Pixel", &["connect.facebook.net", "fbq("]),
    ("Hotjar", &["hotjar"]),
    ("Microsoft Clarity", &["clarity.ms"]),
    ("Matomo", &["matomo", "piwik"]),
    ("Plausible", &["plausible.io"]),
    ("Seznam Sklik", &["c.seznam.cz", "ssp.seznam.cz"]),
    ("LinkedIn Insight", &["snap.licdn.com"]),
];

const FONTS: Signatures = &[
    ("Google Fonts", &["fonts.googleapis.com", "fonts.gstatic.com"]),
    ("Adobe Fonts", &["use.typekit.net", "p.typekit.net"]),
    ("Bunny Fonts", &["fonts.bunny.net"]),
];

const CDNS: Signatures = &[
    ("Cloudflare", &["cdnjs.cloudflare.com", "cdn-cgi/"]),
    ("jsDelivr", &["cdn.jsdelivr.net"]),
    ("unpkg", &["unpkg.com"]),
    ("Amazon CloudFront", &["cloudfront.net"]),
    ("Fastly", &["fastly.net"]),
    ("Akamai", &["akamaihd.net", "akamaized.net"]),
];

/// Header fingerprints for CDNs: (name, header, substring of value or "" for presence).
const CDN_HEADERS: &[(&str, &str, &str)] = &[
    ("Cloudflare", "cf-ray", ""),
    ("Cloudflare", "server", "cloudflare"),
    ("Amazon CloudFront", "x-amz-cf-id", ""),
    ("Fastly", "x-served-by", "cache-"),
    ("Akamai", "x-akamai-transformed", ""),
    ("Vercel", "x-vercel-id", ""),
    ("Netlify", "x-nf-request-id", ""),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologySignals {
    pub platform: Option<String>,
    pub framework: Option<String>,
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub libraries: Vec<String>,
    pub analytics: Vec<String>,
    pub fonts: Vec<String>,
    pub cdns: Vec<String>,
}

pub struct TechnologyAnalyzer;

impl Default for TechnologyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnologyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn first_match(&self, haystack: &str, table: Signatures) -> Option<String> {
        table
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| haystack.contains(n)))
            .map(|(name, _)| name.to_string())
    }

    fn all_matches(&self, haystack: &str, table: Signatures) -> Vec<String> {
        table
            .iter()
            .filter(|(_, needles)| needles.iter().any(|n| haystack.contains(n)))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn detect_platform(&self, page: &ParsedPage) -> Option<String> {
        if let Some(generator) = page.meta_content("generator") {
            let generator_lower = generator.to_lowercase();
            if let Some(platform) = PLATFORMS
                .iter()
                .find(|(name, _)| generator_lower.contains(&name.to_lowercase()))
            {
                return Some(platform.0.to_string());
            }
        }

        self.first_match(page.html_lower(), PLATFORMS)
    }
}

impl SignalExtractor for TechnologyAnalyzer {
    type Signals = TechnologySignals;

    fn name(&self) -> &str {
        "Technology"
    }

    fn extract(&self, page: &ParsedPage) -> TechnologySignals {
        let html = page.html_lower();
        let headers = page.headers();

        let mut cdns = self.all_matches(html, CDNS);
        for (name, header, needle) in CDN_HEADERS {
            let matched = headers
                .get(header)
                .map(|value| needle.is_empty() || value.to_lowercase().contains(needle))
                .unwrap_or(false);
            if matched && !cdns.iter().any(|c| c == name) {
                cdns.push(name.to_string());
            }
        }

        let signals = TechnologySignals {
            platform: self.detect_platform(page),
            framework: self.first_match(html, FRAMEWORKS),
            server: headers.get("server").map(str::to_string),
            powered_by: headers.get("x-powered-by").map(str::to_string),
            libraries: self.all_matches(html, LIBRARIES),
            analytics: self.all_matches(html, ANALYTICS),
            fonts: self.all_matches(html, FONTS),
            cdns,
        };

        log::debug!(
            "Detected platform={:?} framework={:?} server={:?}",
            signals.platform,
            signals.framework,
            signals.server
        );

        signals
    }
}
