//! Accessibility checklist. Every check contributes its weight when it passes
//! and a human-readable issue when it fails, in a single pass.

use super::technical::{heading_levels, is_valid_heading_hierarchy};
use super::{percentage, SignalExtractor};
use crate::components::scoring_engine::{reduce_score, ScoreRule};
use crate::markup::ParsedPage;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

const LANDMARK_ROLES: [&str; 8] = [
    "banner",
    "navigation",
    "main",
    "contentinfo",
    "complementary",
    "search",
    "region",
    "form",
];
const LANDMARK_ELEMENTS: [&str; 5] = ["header", "nav", "main", "footer", "aside"];
const MIN_LANDMARKS: usize = 2;

/// Input types that never need a visible label.
const UNLABELLED_INPUT_TYPES: [&str; 5] = ["hidden", "submit", "button", "reset", "image"];

static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

const SKIP_LINK_TARGETS: [&str; 4] = ["#main", "#content", "#main-content", "#maincontent"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilitySignals {
    pub lang: Option<String>,
    pub has_lang: bool,
    pub has_skip_nav: bool,
    pub aria_label_count: usize,
    pub landmark_count: usize,
    pub form_inputs: usize,
    pub labelled_inputs: usize,
    /// Percentage of counted form controls with an accessible label; 100 with no controls.
    pub form_label_coverage: f64,
    pub empty_links: usize,
    pub empty_buttons: usize,
    pub heading_hierarchy_valid: bool,
    pub images_total: usize,
    pub images_with_alt: usize,
    pub alt_coverage: f64,
    pub score: u8,
    pub issues: Vec<String>,
}

pub struct AccessibilityAnalyzer;

impl Default for AccessibilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessibilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn detect_skip_nav(&self, page: &ParsedPage) -> bool {
        page.select("a[href^='#']").iter().any(|link| {
            let href = ParsedPage::attr(link, "href")
                .unwrap_or("")
                .to_ascii_lowercase();
            let class_or_id = format!(
                "{} {}",
                ParsedPage::attr(link, "class").unwrap_or(""),
                ParsedPage::attr(link, "id").unwrap_or("")
            )
            .to_ascii_lowercase();

            class_or_id.contains("skip")
                || href.contains("skip")
                || SKIP_LINK_TARGETS.contains(&href.as_str())
                || ParsedPage::text(link).to_ascii_lowercase().contains("skip to")
        })
    }

    fn count_landmarks(&self, page: &ParsedPage) -> usize {
        page.select("header, nav, main, footer, aside, [role]")
            .iter()
            .filter(|el| {
                LANDMARK_ELEMENTS.contains(&el.value().name())
                    || ParsedPage::attr(el, "role")
                        .map(|role| listed(&LANDMARK_ROLES, role))
                        .unwrap_or(false)
            })
            .count()
    }

    /// (counted controls, labelled controls)
    fn form_labels(&self, page: &ParsedPage) -> (usize, usize) {
        let label_targets: Vec<String> = page
            .select("label[for]")
            .iter()
            .filter_map(|label| ParsedPage::attr(label, "for"))
            .map(|id| id.trim().to_string())
            .collect();

        let controls: Vec<ElementRef> = page
            .select("input, select, textarea")
            .into_iter()
            .filter(|control| {
                control.value().name() != "input"
                    || !ParsedPage::attr(control, "type")
                        .map(|t| listed(&UNLABELLED_INPUT_TYPES, t))
                        .unwrap_or(false)
            })
            .collect();

        let labelled = controls
            .iter()
            .filter(|control| {
                let by_for = ParsedPage::attr(control, "id")
                    .map(|id| label_targets.iter().any(|target| target == id.trim()))
                    .unwrap_or(false);
                by_for
                    || ParsedPage::has_ancestor(control, "label")
                    || has_non_empty_attr(control, "aria-label")
                    || has_non_empty_attr(control, "aria-labelledby")
                    || has_non_empty_attr(control, "title")
            })
            .count();

        (controls.len(), labelled)
    }

    fn count_empty_links(&self, page: &ParsedPage) -> usize {
        page.select("a")
            .iter()
            .filter(|link| {
                let has_image_alt = link.select(&IMAGE).any(|img| {
                    ParsedPage::attr(&img, "alt")
                        .map(|alt| !alt.trim().is_empty())
                        .unwrap_or(false)
                });
                ParsedPage::text(link).is_empty()
                    && !has_non_empty_attr(link, "aria-label")
                    && !has_non_empty_attr(link, "aria-labelledby")
                    && !has_image_alt
            })
            .count()
    }

    fn count_empty_buttons(&self, page: &ParsedPage) -> usize {
        page.select("button")
            .iter()
            .filter(|button| {
                ParsedPage::text(button).is_empty()
                    && !has_non_empty_attr(button, "aria-label")
                    && !has_non_empty_attr(button, "aria-labelledby")
                    && !has_non_empty_attr(button, "title")
            })
            .count()
    }
}

impl SignalExtractor for AccessibilityAnalyzer {
    type Signals = AccessibilitySignals;

    fn name(&self) -> &str {
        "Accessibility"
    }

    fn extract(&self, page: &ParsedPage) -> AccessibilitySignals {
        let lang = page
            .select_first("html")
            .and_then(|html| ParsedPage::attr(&html, "lang"))
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty());

        let has_skip_nav = self.detect_skip_nav(page);
        let aria_label_count = page.count("[aria-label], [aria-labelledby]");
        let landmark_count = self.count_landmarks(page);
        let (form_inputs, labelled_inputs) = self.form_labels(page);
        let empty_links = self.count_empty_links(page);
        let empty_buttons = self.count_empty_buttons(page);
        let heading_hierarchy_valid = is_valid_heading_hierarchy(&heading_levels(page));

        let images = page.select("img");
        let images_with_alt = images
            .iter()
            .filter(|img| ParsedPage::attr(img, "alt").is_some())
            .count();

        let form_label_coverage = if form_inputs == 0 {
            100.0
        } else {
            percentage(labelled_inputs, form_inputs)
        };
        let alt_coverage = if images.is_empty() {
            100.0
        } else {
            percentage(images_with_alt, images.len())
        };

        let label_ratio = if form_inputs == 0 {
            1.0
        } else {
            labelled_inputs as f64 / form_inputs as f64
        };
        let full_labels = label_ratio >= 1.0;
        let partial_labels = !full_labels && label_ratio >= 0.5;
        let full_alt = images_with_alt == images.len();
        let partial_alt = !full_alt && alt_coverage > 50.0;

        let mut issues = Vec::new();
        if lang.is_none() {
            issues.push("Missing lang attribute on the <html> element".to_string());
        }
        if !has_skip_nav {
            issues.push("No skip-navigation link for keyboard users".to_string());
        }
        if aria_label_count == 0 {
            issues.push("No ARIA labels found".to_string());
        }
        if landmark_count < MIN_LANDMARKS {
            issues.push(format!(
                "Only {} landmark region(s); use header, nav, main and footer",
                landmark_count
            ));
        }
        if !full_labels {
            issues.push(format!(
                "{} of {} form fields have no associated label",
                form_inputs - labelled_inputs,
                form_inputs
            ));
        }
        if empty_links > 0 {
            issues.push(format!("{} link(s) without accessible text", empty_links));
        }
        if empty_buttons > 0 {
            issues.push(format!("{} button(s) without accessible text", empty_buttons));
        }
        if !heading_hierarchy_valid {
            issues.push("Heading levels skip or do not start at h1".to_string());
        }
        if !full_alt {
            issues.push(format!(
                "{} of {} images lack alt text",
                images.len() - images_with_alt,
                images.len()
            ));
        }

        let score = reduce_score(
            0,
            &[
                ScoreRule::new(lang.is_some(), 15),
                ScoreRule::new(has_skip_nav, 10),
                ScoreRule::new(aria_label_count > 0, 10),
                ScoreRule::new(landmark_count >= MIN_LANDMARKS, 10),
                ScoreRule::new(full_labels, 15),
                ScoreRule::new(partial_labels, 7),
                ScoreRule::new(empty_links == 0, 10),
                ScoreRule::new(empty_buttons == 0, 10),
                ScoreRule::new(heading_hierarchy_valid, 10),
                ScoreRule::new(full_alt, 10),
                ScoreRule::new(partial_alt, 5),
            ],
        );

        log::debug!(
            "Accessibility score {} with {} issue(s)",
            score,
            issues.len()
        );

        AccessibilitySignals {
            has_lang: lang.is_some(),
            lang,
            has_skip_nav,
            aria_label_count,
            landmark_count,
            form_inputs,
            labelled_inputs,
            form_label_coverage,
            empty_links,
            empty_buttons,
            heading_hierarchy_valid,
            images_total: images.len(),
            images_with_alt,
            alt_coverage,
            score,
            issues,
        }
    }
}

fn has_non_empty_attr(element: &ElementRef<'_>, name: &str) -> bool {
    ParsedPage::attr(element, name)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}

/// Case-insensitive membership for attribute values.
fn listed(values: &[&str], value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    values.contains(&value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchResult, SiteProbes};
    use crate::markup::ResponseHeaders;

    fn analyze(html: &str) -> AccessibilitySignals {
        let fetch = FetchResult::from_markup("https://example.com/", html, ResponseHeaders::new());
        let page = ParsedPage::parse(&fetch, SiteProbes::default());
        AccessibilityAnalyzer::new().extract(&page)
    }

    #[test]
    fn test_accessible_page_scores_100() {
        let html = r##"<html lang="en"><body>
            <a class="skip-link" href="#main">Skip to content</a>
            <header><nav aria-label="Primary"><a href="/">Home</a></nav></header>
            <main id="main">
              <h1>Title</h1><h2>Section</h2>
              <img src="a.png" alt="A chart">
              <img src="divider.png" alt="">
              <form>
                <label for="email">Email</label><input id="email" type="email">
                <label>Name <input type="text"></label>
                <textarea aria-label="Message"></textarea>
                <input type="hidden" name="token">
                <input type="submit" value="Send">
                <button>Send</button>
              </form>
            </main>
            <footer><a href="/privacy">Privacy</a></footer>
            </body></html>"##;

        let signals = analyze(html);
        assert_eq!(signals.lang.as_deref(), Some("en"));
        assert!(signals.has_skip_nav);
        assert_eq!(signals.form_inputs, 3);
        assert_eq!(signals.labelled_inputs, 3);
        assert!(signals.landmark_count >= 3);
        assert_eq!(signals.empty_links, 0);
        assert_eq!(signals.empty_buttons, 0);
        assert!(signals.issues.is_empty(), "{:?}", signals.issues);
        assert_eq!(signals.score, 100);
    }

    #[test]
    fn test_inaccessible_page() {
        let html = r#"<html><body>
            <h2>Starts low</h2>
            <a href="/x"></a>
            <a href="/y"><img src="icon.png"></a>
            <a href="/z" aria-label="Close"></a>
            <button></button>
            <input type="text" name="q">
            <img src="a.png"><img src="b.png"><img src="c.png" alt="c">
            </body></html>"#;

        let signals = analyze(html);
        assert!(!signals.has_lang);
        assert_eq!(signals.empty_links, 2);
        assert_eq!(signals.empty_buttons, 1);
        assert_eq!(signals.form_inputs, 1);
        assert_eq!(signals.labelled_inputs, 0);
        assert!(!signals.heading_hierarchy_valid);
        // only the ARIA label check passes; alt coverage is 33%
        assert_eq!(signals.score, 10);
        assert!(signals.issues.len() >= 8);
        assert!(signals.issues.iter().any(|i| i.contains("lang")));
    }

    #[test]
    fn test_partial_label_and_alt_coverage() {
        let html = r#"<html lang="cs"><body>
            <input id="a" type="text"><label for="a">A</label>
            <input type="text" title="B">
            <input type="text">
            <img src="1.png" alt="1"><img src="2.png" alt="2"><img src="3.png">
            </body></html>"#;

        let signals = analyze(html);
        assert_eq!(signals.form_inputs, 3);
        assert_eq!(signals.labelled_inputs, 2);
        // lang 15 + partial labels 7 + links 10 + buttons 10 + headings 10 + partial alt 5
        assert_eq!(signals.score, 57);
    }

    #[test]
    fn test_landmark_roles_count() {
        let html = r#"<html><body><div role="banner"></div><div role="Navigation"></div>
            <div role="presentation"></div></body></html>"#;
        assert_eq!(analyze(html).landmark_count, 2);
    }
}
