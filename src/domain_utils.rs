use url::Url;

/// Minimal host utilities
pub struct DomainUtils;

/// Where an `<a href>` points relative to the page it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Internal,
    External,
    /// Fragments, mailto:, tel:, javascript: and unparsable hrefs.
    NonNavigational,
}

impl DomainUtils {
    /// Canonicalize host (lower-case, remove www prefix)
    pub fn canonicalize_domain(domain: &str) -> String {
        let domain_lower = domain.trim().trim_end_matches('.').to_lowercase();
        if let Some(stripped) = domain_lower.strip_prefix("www.") {
            stripped.to_string()
        } else {
            domain_lower
        }
    }

    /// Canonical host of a URL string, if it has one
    pub fn domain_of(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()?
            .host_str()
            .map(Self::canonicalize_domain)
    }

    /// Check if host matches any in list (with subdomain support)
    pub fn matches_domain_list(domain: &str, domain_list: &[&str]) -> bool {
        let domain_lower = Self::canonicalize_domain(domain);

        domain_list.iter().any(|pattern| {
            let pattern_lower = pattern.to_lowercase();
            domain_lower == pattern_lower || domain_lower.ends_with(&format!(".{}", pattern_lower))
        })
    }

    /// Classify an href against the page's base URL
    pub fn classify_link(base: &Url, href: &str) -> LinkTarget {
        let href = href.trim();
        let lower = href.to_ascii_lowercase();
        if href.is_empty()
            || href.starts_with('#')
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
            || lower.starts_with("javascript:")
            || lower.starts_with("data:")
        {
            return LinkTarget::NonNavigational;
        }

        let resolved = match base.join(href) {
            Ok(resolved) => resolved,
            Err(_) => return LinkTarget::NonNavigational,
        };

        if !matches!(resolved.scheme(), "http" | "https") {
            return LinkTarget::NonNavigational;
        }

        let page_host = base.host_str().map(Self::canonicalize_domain);
        let link_host = resolved.host_str().map(Self::canonicalize_domain);

        if page_host.is_some() && page_host == link_host {
            LinkTarget::Internal
        } else {
            LinkTarget::External
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_domain() {
        assert_eq!(
            DomainUtils::canonicalize_domain("www.Example.com"),
            "example.com"
        );
        assert_eq!(
            DomainUtils::canonicalize_domain("example.com."),
            "example.com"
        );
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(
            DomainUtils::domain_of("https://www.example.com/path"),
            Some("example.com".to_string())
        );
        assert_eq!(DomainUtils::domain_of("not a url"), None);
    }

    #[test]
    fn test_matches_domain_list() {
        let domains = ["facebook.com", "x.com"];

        assert!(DomainUtils::matches_domain_list("facebook.com", &domains));
        assert!(DomainUtils::matches_domain_list("m.facebook.com", &domains));
        assert!(DomainUtils::matches_domain_list("www.x.com", &domains));
        assert!(!DomainUtils::matches_domain_list("fax.com", &domains));
    }

    #[test]
    fn test_classify_link() {
        let base = Url::parse("https://www.example.com/blog/").unwrap();

        assert_eq!(
            DomainUtils::classify_link(&base, "/about"),
            LinkTarget::Internal
        );
        assert_eq!(
            DomainUtils::classify_link(&base, "https://example.com/contact"),
            LinkTarget::Internal
        );
        assert_eq!(
            DomainUtils::classify_link(&base, "https://other.org/"),
            LinkTarget::External
        );
        assert_eq!(
            DomainUtils::classify_link(&base, "#top"),
            LinkTarget::NonNavigational
        );
        assert_eq!(
            DomainUtils::classify_link(&base, "mailto:hi@example.com"),
            LinkTarget::NonNavigational
        );
    }
}
