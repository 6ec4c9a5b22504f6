use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FetcherConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_probe_timeout_seconds")]
    pub probe_timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            probe_timeout_seconds: default_probe_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_probe_timeout_seconds() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("SiteAnalyzer/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Option<log::LevelFilter> {
        self.level.trim().parse().ok()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

impl AnalyzerConfig {
    /// Load a TOML or YAML file, picked by extension (TOML when unknown).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists; `None` when there is no such file.
    pub fn load_if_exists<P: AsRef<Path>>(path: P) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn default_path() -> &'static str {
        "site-analyzer.toml"
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write_default<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
        std::fs::write(path, Self::default().to_toml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.fetcher.timeout_seconds, 10);
        assert_eq!(config.fetcher.probe_timeout_seconds, 5);
        assert!(config.fetcher.user_agent.starts_with("SiteAnalyzer/"));
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.output.pretty);
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[fetcher]\ntimeout_seconds = 3\n\n[logging]\nlevel = \"debug\"\n\n[output]\nformat = \"json\""
        )
        .unwrap();

        let config = AnalyzerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.fetcher.timeout_seconds, 3);
        assert_eq!(config.fetcher.probe_timeout_seconds, 5);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
        assert_eq!(
            config.logging.and_then(|l| l.level_filter()),
            Some(log::LevelFilter::Debug)
        );
    }

    #[test]
    fn test_load_yaml() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "fetcher:\n  user_agent: TestBot/1.0\noutput:\n  pretty: false"
        )
        .unwrap();

        let config = AnalyzerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.fetcher.user_agent, "TestBot/1.0");
        assert_eq!(config.fetcher.timeout_seconds, 10);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[fetcher\ntimeout_seconds = ").unwrap();
        assert!(AnalyzerConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyzerConfig::load_if_exists(dir.path().join("absent.toml")).unwrap();
        assert!(config.is_none());

        let path = dir.path().join("present.toml");
        AnalyzerConfig::write_default(&path).unwrap();
        let config = AnalyzerConfig::load_if_exists(&path).unwrap();
        assert_eq!(config, Some(AnalyzerConfig::default()));
    }

    #[test]
    fn test_generated_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated.toml");
        AnalyzerConfig::write_default(&path).unwrap();

        let config = AnalyzerConfig::load_from_file(&path).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }
}
