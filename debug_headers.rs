use site_analyzer::config::FetcherConfig;
use site_analyzer::features::security::SECURITY_HEADERS;
use site_analyzer::Fetcher;

#[tokio::main]
async fn main() {
    env_logger::init();

    let input = match std::env::args().nth(1) {
        Some(input) => input,
        None => {
            eprintln!("usage: debug-headers <URL>");
            std::process::exit(2);
        }
    };

    let fetcher = match Fetcher::new(&FetcherConfig::default()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let url = match Fetcher::normalize_url(&input) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let (page, probes) = match fetcher.fetch_with_probes(&url).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    println!("Requested: {}", page.url);
    println!("Final URL: {}", page.final_url);
    println!(
        "Status:    {} ({}ms)",
        page.status_code,
        page.response_time_ms
    );
    println!("Body:      {} bytes", page.html.len());
    println!();

    println!("Headers ({}):", page.headers.len());
    for (name, value) in page.headers.iter() {
        println!("  {}: {}", name, value);
    }
    println!();

    println!("Security headers:");
    for (name, penalty) in SECURITY_HEADERS {
        let verdict = if page.headers.contains(name) {
            "present".to_string()
        } else {
            format!("MISSING (-{})", penalty)
        };
        println!("  {:<28} {}", name, verdict);
    }
    println!();

    println!(
        "sitemap.xml: {}",
        if probes.sitemap { "found" } else { "not found" }
    );
    println!(
        "robots.txt:  {}",
        if probes.robots_txt { "found" } else { "not found" }
    );
}
