use flate2::write::GzEncoder;
use flate2::Compression;
use site_analyzer::config::FetcherConfig;
use site_analyzer::{FetchError, Fetcher};
use std::io::Write;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout_seconds: u64) -> Fetcher {
    Fetcher::new(&FetcherConfig {
        timeout_seconds,
        probe_timeout_seconds: 2,
        ..FetcherConfig::default()
    })
    .unwrap()
}

/// A loopback URL nothing is listening on.
fn closed_port_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap()
}

#[tokio::test]
async fn test_fetch_captures_headers_and_probes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Frame-Options", "DENY")
                .insert_header("Server", "nginx")
                .set_body_string("<html><body><h1>Hi</h1></body></html>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = Fetcher::normalize_url(&server.uri()).unwrap();
    let (page, probes) = fetcher(5).fetch_with_probes(&url).await.unwrap();

    assert!(page.status_ok);
    assert_eq!(page.status_code, 200);
    assert!(page.html.contains("<h1>Hi</h1>"));
    assert_eq!(page.headers.get("x-frame-options"), Some("DENY"));
    assert_eq!(page.headers.get("SERVER"), Some("nginx"));
    assert!(probes.sitemap);
    assert!(!probes.robots_txt);
}

#[tokio::test]
async fn test_probes_use_site_origin() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/blog/post/", server.uri())).unwrap();
    let fetcher = fetcher(5);
    assert!(fetcher.probe(&url, "/robots.txt").await);
    assert!(!fetcher.probe(&url, "/sitemap.xml").await);
}

#[tokio::test]
async fn test_non_success_status_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = Fetcher::normalize_url(&server.uri()).unwrap();
    let err = fetcher(5).fetch_with_probes(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let url = Fetcher::normalize_url(&server.uri()).unwrap();
    let err = fetcher(1).fetch(&url).await.unwrap_err();
    assert!(
        matches!(err, FetchError::Timeout { seconds: 1, .. }),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_unreachable_host_probes_false_fetch_fails() {
    let url = closed_port_url();
    let fetcher = fetcher(2);

    assert!(!fetcher.probe(&url, "/sitemap.xml").await);
    assert!(!fetcher.probe(&url, "/robots.txt").await);

    let err = fetcher.fetch_with_probes(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_gzip_body_is_decoded_and_header_kept() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(b"<html><body><p>compressed page</p></body></html>")
        .unwrap();
    let body = encoder.finish().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(body),
        )
        .mount(&server)
        .await;

    let url = Fetcher::normalize_url(&server.uri()).unwrap();
    let page = fetcher(5).fetch(&url).await.unwrap();
    assert!(page.html.contains("compressed page"));
    assert_eq!(page.headers.get("content-encoding"), Some("gzip"));
}
