use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::markup::ResponseHeaders;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::{Duration, Instant};
use url::Url;

/// Raw outcome of the primary GET.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub url: String,
    pub final_url: String,
    pub html: String,
    pub headers: ResponseHeaders,
    pub status_ok: bool,
    pub status_code: u16,
    pub response_time_ms: u64,
}

impl FetchResult {
    /// Build a result from markup already in hand (fixtures, cached pages).
    pub fn from_markup(url: &str, html: &str, headers: ResponseHeaders) -> Self {
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            html: html.to_string(),
            headers,
            status_ok: true,
            status_code: 200,
            response_time_ms: 0,
        }
    }
}

/// Best-effort existence checks for well-known site files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProbes {
    pub sitemap: bool,
    pub robots_txt: bool,
}

pub struct Fetcher {
    client: Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            timeout,
            probe_timeout: Duration::from_secs(config.probe_timeout_seconds),
        })
    }

    /// Normalize user input into an absolute http(s) URL, inserting `https://`
    /// when no scheme was given.
    pub fn normalize_url(input: &str) -> Result<Url, FetchError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FetchError::InvalidUrl {
                input: input.to_string(),
                reason: "empty URL".to_string(),
            });
        }

        let lower = trimmed.to_ascii_lowercase();
        let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let url = Url::parse(&candidate).map_err(|e| FetchError::InvalidUrl {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        if url.host_str().is_none() {
            return Err(FetchError::InvalidUrl {
                input: input.to_string(),
                reason: "URL has no host".to_string(),
            });
        }

        Ok(url)
    }

    /// Fetch the page and run both probes concurrently. The probes never fail;
    /// a failed page fetch fails the whole call.
    pub async fn fetch_with_probes(
        &self,
        url: &Url,
    ) -> Result<(FetchResult, SiteProbes), FetchError> {
        let (page, sitemap, robots_txt) = tokio::join!(
            self.fetch(url),
            self.probe(url, "/sitemap.xml"),
            self.probe(url, "/robots.txt"),
        );

        Ok((page?, SiteProbes { sitemap, robots_txt }))
    }

    /// Bounded GET of the target page.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        log::debug!("Fetching {} (timeout {:?})", url, self.timeout);

        match tokio::time::timeout(self.timeout, self.get(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn get(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let start = Instant::now();

        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .header("Accept-Encoding", "gzip, deflate")
            .send()
            .await
            .map_err(|e| self.network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let mut headers = ResponseHeaders::default();
        for (name, value) in response.headers() {
            headers.insert(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.network_error(url, e))?;

        let html = decode_body(&bytes, headers.get("content-encoding")).map_err(|e| {
            FetchError::Body {
                url: url.to_string(),
                source: e,
            }
        })?;

        let response_time_ms = start.elapsed().as_millis() as u64;
        log::debug!(
            "Fetched {} -> {} ({} bytes, {}ms)",
            url,
            final_url,
            html.len(),
            response_time_ms
        );

        Ok(FetchResult {
            url: url.to_string(),
            final_url,
            html,
            headers,
            status_ok: true,
            status_code: status.as_u16(),
            response_time_ms,
        })
    }

    /// HEAD `path` on the origin of `url`. Any failure resolves to `false`.
    pub async fn probe(&self, url: &Url, path: &str) -> bool {
        let target = match url.join(path) {
            Ok(target) => target,
            Err(e) => {
                log::debug!("Cannot build probe URL for {}{}: {}", url, path, e);
                return false;
            }
        };

        let request = self
            .client
            .head(target.as_str())
            .timeout(self.probe_timeout)
            .send();

        match tokio::time::timeout(self.probe_timeout, request).await {
            Ok(Ok(response)) => {
                let found = response.status().is_success();
                log::debug!("Probe {} -> {}", target, response.status());
                found
            }
            Ok(Err(e)) => {
                log::debug!("Probe {} failed: {}", target, e);
                false
            }
            Err(_) => {
                log::debug!("Probe {} timed out", target);
                false
            }
        }
    }

    fn network_error(&self, url: &Url, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Decode a response body according to its `content-encoding`. Unknown
/// encodings are passed through untouched.
pub fn decode_body(bytes: &[u8], encoding: Option<&str>) -> std::io::Result<String> {
    let mut decoded = Vec::new();

    match encoding.map(|e| e.trim().to_ascii_lowercase()).as_deref() {
        Some("gzip") | Some("x-gzip") => {
            GzDecoder::new(bytes).read_to_end(&mut decoded)?;
        }
        Some("deflate") => {
            // Servers disagree on whether "deflate" means zlib-wrapped or raw.
            if ZlibDecoder::new(bytes).read_to_end(&mut decoded).is_err() {
                decoded.clear();
                DeflateDecoder::new(bytes).read_to_end(&mut decoded)?;
            }
        }
        _ => decoded.extend_from_slice(bytes),
    }

    Ok(String::from_utf8_lossy(&decoded).into_owned())
}
