//! Markup index: the parsed document plus the response facts every analyzer
//! reads. Analyzers query it through `select`/`attr`/`text` and never touch the
//! parser directly.

use crate::fetcher::{FetchResult, SiteProbes};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

const HIDDEN_TEXT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Case-insensitive response header map. Keys are stored lower-cased and
/// repeated headers are joined with `, `.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(BTreeMap<String, String>);

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        let key = name.trim().to_ascii_lowercase();
        let value = value.trim();
        self.0
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(|value| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// A fetched page parsed once and shared read-only by every analyzer.
pub struct ParsedPage<'a> {
    fetch: &'a FetchResult,
    probes: SiteProbes,
    base_url: Option<Url>,
    document: Html,
    html_lower: String,
    json_ld: Vec<Value>,
    visible_text: String,
}

impl<'a> ParsedPage<'a> {
    pub fn parse(fetch: &'a FetchResult, probes: SiteProbes) -> Self {
        let document = Html::parse_document(&fetch.html);
        let base_url = Url::parse(&fetch.final_url)
            .or_else(|_| Url::parse(&fetch.url))
            .ok();

        let json_ld = extract_json_ld(&document);
        let visible_text = extract_visible_text(&document);

        Self {
            fetch,
            probes,
            base_url,
            document,
            html_lower: fetch.html.to_lowercase(),
            json_ld,
            visible_text,
        }
    }

    /// The URL the page was finally served from.
    pub fn url(&self) -> &str {
        &self.fetch.final_url
    }

    /// The URL that was requested, before redirects.
    pub fn requested_url(&self) -> &str {
        &self.fetch.url
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn is_https(&self) -> bool {
        self.base_url
            .as_ref()
            .map(|u| u.scheme() == "https")
            .unwrap_or(false)
    }

    pub fn html(&self) -> &str {
        &self.fetch.html
    }

    pub fn html_lower(&self) -> &str {
        &self.html_lower
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.fetch.headers
    }

    pub fn probes(&self) -> SiteProbes {
        self.probes
    }

    /// All elements matching a CSS selector, in document order. An invalid
    /// selector matches nothing.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(e) => {
                log::debug!("Invalid selector '{}': {:?}", css, e);
                Vec::new()
            }
        }
    }

    pub fn select_first(&self, css: &str) -> Option<ElementRef<'_>> {
        self.select(css).into_iter().next()
    }

    pub fn count(&self, css: &str) -> usize {
        self.select(css).len()
    }

    pub fn attr<'e>(element: &ElementRef<'e>, name: &str) -> Option<&'e str> {
        element.value().attr(name)
    }

    /// Text content of an element with whitespace collapsed.
    pub fn text(element: &ElementRef<'_>) -> String {
        collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
    }

    /// Content of the first `<meta>` whose `name` or `property` equals `key`
    /// (case-insensitive). Blank values count as absent.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.select("meta").into_iter().find_map(|meta| {
            let matches = ["name", "property"].iter().any(|attr| {
                meta.value()
                    .attr(attr)
                    .map(|v| v.trim().eq_ignore_ascii_case(key))
                    .unwrap_or(false)
            });
            if !matches {
                return None;
            }
            meta.value()
                .attr("content")
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
        })
    }

    /// Every JSON-LD block that parsed successfully.
    pub fn json_ld(&self) -> &[Value] {
        &self.json_ld
    }

    /// Body text with script/style subtrees removed and whitespace collapsed.
    pub fn visible_text(&self) -> &str {
        &self.visible_text
    }

    pub fn has_ancestor(element: &ElementRef<'_>, tag: &str) -> bool {
        element.ancestors().any(|node| match node.value() {
            Node::Element(e) => e.name().eq_ignore_ascii_case(tag),
            _ => false,
        })
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_json_ld(document: &Html) -> Vec<Value> {
    let selector = match Selector::parse("script[type]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut blocks = Vec::new();
    for script in document.select(&selector) {
        let is_json_ld = script
            .value()
            .attr("type")
            .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            .unwrap_or(false);
        if !is_json_ld {
            continue;
        }

        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => blocks.push(value),
            Err(e) => log::debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }

    blocks
}

fn extract_visible_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    for node in root.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(e) => HIDDEN_TEXT_TAGS.contains(&e.name()),
                _ => false,
            });
            let trimmed = text.trim();
            if !hidden && !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }

    collapse_whitespace(&parts.join(" "))
}
