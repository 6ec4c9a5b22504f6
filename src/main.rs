use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use log::LevelFilter;
use site_analyzer::components::IssueCategory;
use site_analyzer::config::{AnalyzerConfig, OutputFormat};
use site_analyzer::{AnalysisResult, WebsiteAnalyzer};
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("site-analyzer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Website audit engine: SEO, performance, security, accessibility, social and GEO scoring")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("Website to analyze (https:// is assumed when no scheme is given)")
                .required_unless_present("generate-config"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (TOML or YAML)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the full analysis record as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Page fetch timeout, overrides the configuration")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        match AnalyzerConfig::write_default(generate_path) {
            Ok(()) => println!("Default configuration written to {}", generate_path),
            Err(e) => {
                eprintln!("Error writing configuration: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(&matches).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let explicit_config = matches.get_one::<String>("config");
    let config_path = explicit_config
        .map(String::as_str)
        .unwrap_or(AnalyzerConfig::default_path());
    let loaded = AnalyzerConfig::load_if_exists(config_path)
        .with_context(|| format!("Error loading configuration from {}", config_path))?;
    let config_found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    init_logging(matches.get_flag("verbose"), &config);

    if explicit_config.is_some() && !config_found {
        log::warn!(
            "Configuration file {} not found, using defaults",
            config_path
        );
    }

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.fetcher.timeout_seconds = *timeout;
    }
    if matches.get_flag("json") {
        config.output.format = OutputFormat::Json;
    }

    let url = matches.get_one::<String>("url").context("No URL given")?;

    let analyzer = WebsiteAnalyzer::new(&config)?;
    let result = analyzer.analyze(url).await?;

    match config.output.format {
        OutputFormat::Json => {
            let json = if config.output.pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", json);
        }
        OutputFormat::Text => print_report(&result),
    }

    Ok(())
}

/// `-v` wins over the configured level; `RUST_LOG` is applied last.
fn init_logging(verbose: bool, config: &AnalyzerConfig) {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        config
            .logging
            .as_ref()
            .and_then(|logging| logging.level_filter())
            .unwrap_or(LevelFilter::Info)
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();
}

fn print_report(result: &AnalysisResult) {
    let scores = &result.category_scores;

    println!("Website analysis: {}", result.final_url);
    println!(
        "Analyzed at {} in {}ms",
        result.analyzed_at.to_rfc3339(),
        result.duration_ms
    );
    println!();
    println!("Overall score: {}/100", result.overall_score);
    println!("  SEO:           {:>3}", scores.seo);
    println!("  Performance:   {:>3}", scores.performance);
    println!("  Security:      {:>3}", scores.security);
    println!("  Accessibility: {:>3}", scores.accessibility);
    println!("  Social:        {:>3}", scores.social);
    println!("  GEO:           {:>3}", scores.geo);

    let technology = &result.signals.technology;
    if technology.platform.is_some()
        || technology.framework.is_some()
        || technology.server.is_some()
    {
        println!();
        println!(
            "Technology: platform={} framework={} server={}",
            technology.platform.as_deref().unwrap_or("-"),
            technology.framework.as_deref().unwrap_or("-"),
            technology.server.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!(
        "Issues: {} critical, {} warning, {} info",
        result.issue_count.critical, result.issue_count.warning, result.issue_count.info
    );
    for issue in &result.issues {
        let marker = match issue.category {
            IssueCategory::Critical => "CRITICAL",
            IssueCategory::Warning => "WARNING ",
            IssueCategory::Info => "INFO    ",
        };
        println!("  [{}] {}: {}", marker, issue.title, issue.description);
    }

    let recommendation = &result.recommendation;
    println!();
    println!(
        "Recommended package: {} ({}), confidence {}%",
        recommendation.package_name, recommendation.package_id, recommendation.confidence
    );
    println!("  {}", recommendation.reasoning);
    if !recommendation.matched_needs.is_empty() {
        println!("  Needs: {}", recommendation.matched_needs.join(", "));
    }
}
