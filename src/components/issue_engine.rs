//! Issue Engine Component
//!
//! A fixed, ordered table of rules over the page signals and category scores.
//! Every rule is evaluated independently; the resulting list keeps table order
//! and is never re-sorted.

use crate::components::scoring_engine::CategoryScores;
use crate::features::PageSignals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCount {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl IssueCount {
    pub fn from_issues(issues: &[Issue]) -> Self {
        issues.iter().fold(Self::default(), |mut count, issue| {
            match issue.category {
                IssueCategory::Critical => count.critical += 1,
                IssueCategory::Warning => count.warning += 1,
                IssueCategory::Info => count.info += 1,
            }
            count
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

/// What a rule can look at.
pub struct IssueContext<'a> {
    pub signals: &'a PageSignals,
    pub scores: &'a CategoryScores,
}

pub struct IssueRule {
    pub category: IssueCategory,
    pub title: &'static str,
    pub description: &'static str,
    pub impact: &'static str,
    pub recommendation: &'static str,
    pub applies: fn(&IssueContext<'_>) -> bool,
}

impl IssueRule {
    fn to_issue(&self) -> Issue {
        Issue {
            category: self.category,
            title: self.title.to_string(),
            description: self.description.to_string(),
            impact: self.impact.to_string(),
            recommendation: self.recommendation.to_string(),
        }
    }
}

use IssueCategory::{Critical, Info, Warning};

pub const ISSUE_RULES: &[IssueRule] = &[
    IssueRule {
        category: Critical,
        title: "Missing SSL certificate",
        description: "The site is not served over HTTPS.",
        impact: "Browsers mark the site as not secure and search engines rank it lower.",
        recommendation: "Install a TLS certificate and redirect all HTTP traffic to HTTPS.",
        applies: |ctx| !ctx.signals.security.https_redirect,
    },
    IssueRule {
        category: Critical,
        title: "Missing page title",
        description: "The page has no <title> element.",
        impact: "Search results show a generated title and click-through drops.",
        recommendation: "Add a unique, descriptive title of 30-60 characters.",
        applies: |ctx| ctx.signals.technical.title.is_none(),
    },
    IssueRule {
        category: Critical,
        title: "Missing H1 heading",
        description: "The page has no H1 heading.",
        impact: "Search engines and screen readers cannot identify the main topic.",
        recommendation: "Add exactly one H1 that states what the page is about.",
        applies: |ctx| ctx.signals.technical.headings.h1 == 0,
    },
    IssueRule {
        category: Warning,
        title: "Multiple H1 headings",
        description: "The page contains more than one H1 heading.",
        impact: "The main topic of the page becomes ambiguous.",
        recommendation: "Keep a single H1 and demote the others to H2.",
        applies: |ctx| ctx.signals.technical.headings.h1 > 1,
    },
    IssueRule {
        category: Warning,
        title: "Missing meta description",
        description: "The page has no meta description.",
        impact: "Search engines pick an arbitrary snippet for the result.",
        recommendation: "Write a meta description of 120-160 characters.",
        applies: |ctx| ctx.signals.technical.meta_description.is_none(),
    },
    IssueRule {
        category: Critical,
        title: "Not mobile friendly",
        description: "The page has no viewport meta tag.",
        impact: "Mobile visitors get a zoomed-out desktop layout and mobile rankings suffer.",
        recommendation: "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> and a responsive layout.",
        applies: |ctx| !ctx.signals.technical.has_viewport,
    },
    IssueRule {
        category: Warning,
        title: "Images without alt text",
        description: "Some images have no alt attribute.",
        impact: "Image search and screen-reader users miss their content.",
        recommendation: "Describe every meaningful image in its alt attribute.",
        applies: |ctx| ctx.signals.technical.images_without_alt > 0,
    },
    IssueRule {
        category: Warning,
        title: "Missing sitemap.xml",
        description: "No sitemap was found at /sitemap.xml.",
        impact: "Search engines discover new and deep pages more slowly.",
        recommendation: "Generate a sitemap.xml and submit it in Search Console.",
        applies: |ctx| !ctx.signals.technical.has_sitemap,
    },
    IssueRule {
        category: Info,
        title: "Missing robots.txt",
        description: "No robots.txt was found at the site root.",
        impact: "Crawlers get no guidance and no sitemap reference.",
        recommendation: "Add a robots.txt that references the sitemap.",
        applies: |ctx| !ctx.signals.technical.has_robots_txt,
    },
    IssueRule {
        category: Warning,
        title: "No structured data",
        description: "The page carries no schema.org JSON-LD markup.",
        impact: "The page is not eligible for rich results and is harder for AI engines to interpret.",
        recommendation: "Add JSON-LD for the organization, business and key content.",
        applies: |ctx| !ctx.signals.technical.has_structured_data,
    },
    IssueRule {
        category: Info,
        title: "No clear keywords",
        description: "No recurring keywords were found in the page text.",
        impact: "The page does not signal which searches it should rank for.",
        recommendation: "Build the copy around a few target phrases.",
        applies: |ctx| ctx.signals.technical.keyword_density.is_empty(),
    },
    IssueRule {
        category: Warning,
        title: "Thin content",
        description: "The page has fewer than 300 words of text.",
        impact: "Short pages rarely rank for competitive queries.",
        recommendation: "Expand the copy with useful, specific information.",
        applies: |ctx| ctx.signals.content.word_count < 300,
    },
    IssueRule {
        category: Info,
        title: "Text is hard to read",
        description: "The readability score is below 40.",
        impact: "Visitors skim and leave before reaching the call to action.",
        recommendation: "Use shorter sentences and simpler words.",
        applies: |ctx| ctx.signals.content.readability_score < 40.0,
    },
    IssueRule {
        category: Warning,
        title: "Weak security headers",
        description: "Most recommended security headers are missing.",
        impact: "The site is more exposed to clickjacking, XSS and protocol downgrade.",
        recommendation: "Configure HSTS, CSP, X-Frame-Options, X-Content-Type-Options and Referrer-Policy.",
        applies: |ctx| ctx.scores.security < 50,
    },
    IssueRule {
        category: Info,
        title: "Incomplete security headers",
        description: "Some recommended security headers are missing.",
        impact: "Browsers apply weaker default protections.",
        recommendation: "Add the missing security headers on the web server.",
        applies: |ctx| (50..80).contains(&ctx.scores.security),
    },
    IssueRule {
        category: Warning,
        title: "Mixed content",
        description: "The HTTPS page loads resources over plain HTTP.",
        impact: "Browsers block or flag insecure resources.",
        recommendation: "Serve every resource over HTTPS.",
        applies: |ctx| ctx.signals.security.has_mixed_content,
    },
    IssueRule {
        category: Warning,
        title: "Poor performance",
        description: "The page is heavy and likely slow to load.",
        impact: "Slow pages lose visitors and rank lower on mobile.",
        recommendation: "Reduce scripts and images, enable compression and caching.",
        applies: |ctx| ctx.scores.performance < 50,
    },
    IssueRule {
        category: Info,
        title: "Performance could be better",
        description: "The page carries more weight than necessary.",
        impact: "Load time on slower connections suffers.",
        recommendation: "Defer non-critical scripts and optimise images.",
        applies: |ctx| (50..70).contains(&ctx.scores.performance),
    },
    IssueRule {
        category: Warning,
        title: "Oversized images",
        description: "Some images are declared wider or taller than 1000px.",
        impact: "Large images dominate page weight.",
        recommendation: "Serve resized, modern-format images with srcset.",
        applies: |ctx| ctx.signals.performance.large_images > 0,
    },
    IssueRule {
        category: Warning,
        title: "No compression",
        description: "The response is not gzip or brotli compressed.",
        impact: "Every visitor downloads several times more data than needed.",
        recommendation: "Enable gzip or brotli compression on the server.",
        applies: |ctx| !ctx.signals.performance.has_compression,
    },
    IssueRule {
        category: Warning,
        title: "Title too short",
        description: "The page title is shorter than 30 characters.",
        impact: "Valuable search-result space is left unused.",
        recommendation: "Extend the title with the main keyword and brand.",
        applies: |ctx| {
            ctx.signals.technical.title.is_some() && ctx.signals.technical.title_length < 30
        },
    },
    IssueRule {
        category: Info,
        title: "Title too long",
        description: "The page title is longer than 60 characters.",
        impact: "Search engines truncate the title in results.",
        recommendation: "Shorten the title to at most 60 characters.",
        applies: |ctx| ctx.signals.technical.title_length > 60,
    },
    IssueRule {
        category: Info,
        title: "Meta description length",
        description: "The meta description is outside the 120-160 character range.",
        impact: "The snippet is either truncated or too thin to persuade.",
        recommendation: "Rewrite the description to 120-160 characters.",
        applies: |ctx| {
            ctx.signals.technical.meta_description.is_some()
                && !(120..=160).contains(&ctx.signals.technical.meta_description_length)
        },
    },
    IssueRule {
        category: Info,
        title: "Missing canonical URL",
        description: "The page does not declare a canonical URL.",
        impact: "Duplicate URLs may split ranking signals.",
        recommendation: "Add <link rel=\"canonical\"> pointing at the preferred URL.",
        applies: |ctx| !ctx.signals.technical.has_canonical,
    },
    IssueRule {
        category: Info,
        title: "Low text to HTML ratio",
        description: "Visible text is less than 10% of the markup.",
        impact: "The page looks code-heavy and content-light to crawlers.",
        recommendation: "Trim unused markup and add meaningful copy.",
        applies: |ctx| ctx.signals.technical.text_html_ratio < 10.0,
    },
    IssueRule {
        category: Info,
        title: "Broken heading hierarchy",
        description: "Heading levels skip or do not start at H1.",
        impact: "The document outline is confusing for crawlers and assistive technology.",
        recommendation: "Nest headings in order: H1, then H2, then H3.",
        applies: |ctx| !ctx.signals.technical.heading_hierarchy_valid,
    },
    IssueRule {
        category: Warning,
        title: "Incomplete Open Graph tags",
        description: "og:title, og:description or og:image is missing.",
        impact: "Shared links render without a proper preview.",
        recommendation: "Add og:title, og:description and an absolute og:image URL.",
        applies: |ctx| !ctx.signals.open_graph.has_complete_open_graph(),
    },
    IssueRule {
        category: Info,
        title: "Missing Twitter card",
        description: "No twitter:card meta tag was found.",
        impact: "Links shared on X show a plain preview.",
        recommendation: "Add twitter:card with summary_large_image.",
        applies: |ctx| ctx.signals.open_graph.twitter_card.is_none(),
    },
    IssueRule {
        category: Info,
        title: "No social profile links",
        description: "The page does not link to any social profiles.",
        impact: "Visitors cannot follow the brand and entity signals are weaker.",
        recommendation: "Link the company's social profiles from the footer.",
        applies: |ctx| ctx.signals.open_graph.social_links.is_empty(),
    },
    IssueRule {
        category: Warning,
        title: "Missing language attribute",
        description: "The <html> element has no lang attribute.",
        impact: "Screen readers may pronounce the content incorrectly.",
        recommendation: "Set lang on the <html> element.",
        applies: |ctx| !ctx.signals.accessibility.has_lang,
    },
    IssueRule {
        category: Warning,
        title: "Links without text",
        description: "Some links have no accessible text.",
        impact: "Screen-reader users cannot tell where the links go.",
        recommendation: "Give every link visible text or an aria-label.",
        applies: |ctx| ctx.signals.accessibility.empty_links > 0,
    },
    IssueRule {
        category: Warning,
        title: "Buttons without text",
        description: "Some buttons have no accessible text.",
        impact: "Screen-reader users cannot tell what the buttons do.",
        recommendation: "Give every button text or an aria-label.",
        applies: |ctx| ctx.signals.accessibility.empty_buttons > 0,
    },
    IssueRule {
        category: Info,
        title: "No FAQ section",
        description: "The page has no FAQ or question-and-answer content.",
        impact: "AI answer engines have fewer direct answers to quote.",
        recommendation: "Add an FAQ section with FAQPage schema.",
        applies: |ctx| !ctx.signals.geo.has_faq,
    },
    IssueRule {
        category: Info,
        title: "No business schema",
        description: "Neither LocalBusiness nor Organization schema was found.",
        impact: "Search and AI engines cannot reliably identify the business.",
        recommendation: "Add LocalBusiness or Organization JSON-LD with name, address and phone.",
        applies: |ctx| !ctx.signals.geo.has_local_business && !ctx.signals.geo.has_organization,
    },
    IssueRule {
        category: Info,
        title: "Content looks outdated",
        description: "No current copyright year or publication date was found.",
        impact: "Stale-looking content is cited and trusted less.",
        recommendation: "Keep the copyright year current and mark up publication dates.",
        applies: |ctx| !ctx.signals.geo.has_fresh_copyright && !ctx.signals.geo.has_date_published,
    },
    IssueRule {
        category: Warning,
        title: "Missing contact information",
        description: "No phone number or e-mail address was found on the page.",
        impact: "Visitors who are ready to buy cannot reach the business.",
        recommendation: "Show a clickable phone number and e-mail address.",
        applies: |ctx| !ctx.signals.geo.has_phone && !ctx.signals.geo.has_email,
    },
];

pub struct IssueEngine {
    rules: &'static [IssueRule],
}

impl Default for IssueEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueEngine {
    pub fn new() -> Self {
        Self { rules: ISSUE_RULES }
    }

    /// Evaluate every rule in table order.
    pub fn evaluate(&self, signals: &PageSignals, scores: &CategoryScores) -> Vec<Issue> {
        let ctx = IssueContext { signals, scores };
        let issues: Vec<Issue> = self
            .rules
            .iter()
            .filter(|rule| (rule.applies)(&ctx))
            .map(IssueRule::to_issue)
            .collect();

        log::debug!(
            "{} of {} issue rules fired",
            issues.len(),
            self.rules.len()
        );

        issues
    }
}
