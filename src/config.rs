use crate::cache::CacheConfig;
use crate::cli::{Cli, OutputFormat};
use crate::http_client::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Source of `OGC_*` override variables
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML configuration: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("invalid JSON configuration: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("invalid environment override: {0}")]
    Environment(String),

    #[error("configuration files must be .toml or .json, not .{0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings of the `ogc-inspect` binary.
///
/// Every section and field has a default, so a file only needs to name the
/// values it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub cache: CacheSettings,
    pub output: OutputConfig,
}

/// Remote fetching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    /// Overrides the default `ogc-capabilities/<version>` user agent
    pub user_agent: Option<String>,
}

/// Parsed-document cache shared by every endpoint of the process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    pub max_entries: u64,
    /// Entry lifetime; unset keeps documents for the whole run
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let http = HttpClientConfig::default();
        Self {
            timeout_seconds: http.timeout_seconds,
            retry_attempts: http.retry_attempts,
            retry_delay_ms: http.retry_delay_ms,
            max_retry_delay_ms: http.max_retry_delay_ms,
            user_agent: None,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: CacheConfig::default().max_entries,
            ttl_seconds: None,
        }
    }
}

/// Builds a [`Config`] from its layered sources
pub struct ConfigManager;

impl ConfigManager {
    /// Later layers win: file, then `OGC_*` variables, then command-line options
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let config = match &cli.config {
            Some(config_path) => Self::load_from_file(config_path).await?,
            None => Self::find_config_file().await?.unwrap_or_default(),
        };

        let config = Self::apply_environment_overrides(config)?;
        let config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Read a TOML or JSON file; without an extension both are tried
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => match toml::from_str::<Config>(&content) {
                Ok(config) => Ok(config),
                Err(_) => Ok(serde_json::from_str(&content)?),
            },
        }
    }

    /// First config file found in the working directory, then in
    /// `<config dir>/ogc-inspect`
    pub async fn find_config_file() -> Result<Option<Config>> {
        const NAMES: [&str; 4] = [
            "ogc-inspect.toml",
            "ogc-inspect.json",
            ".ogc-inspect.toml",
            ".ogc-inspect.json",
        ];

        let search_dirs = std::iter::once(PathBuf::new())
            .chain(dirs::config_dir().map(|dir| dir.join("ogc-inspect")));
        for dir in search_dirs {
            if let Some(path) = NAMES.iter().map(|name| dir.join(name)).find(|p| p.exists()) {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        Ok(None)
    }

    /// [`Self::apply_environment_overrides_with`] over the process environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Overlay every `OGC_*` variable `env` defines
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(timeout) = env.get("OGC_TIMEOUT") {
            config.network.timeout_seconds = parse_env("OGC_TIMEOUT", &timeout)?;
        }
        if let Some(attempts) = env.get("OGC_RETRY_ATTEMPTS") {
            config.network.retry_attempts = parse_env("OGC_RETRY_ATTEMPTS", &attempts)?;
        }
        if let Some(delay) = env.get("OGC_RETRY_DELAY_MS") {
            config.network.retry_delay_ms = parse_env("OGC_RETRY_DELAY_MS", &delay)?;
        }
        if let Some(user_agent) = env.get("OGC_USER_AGENT") {
            config.network.user_agent = Some(user_agent);
        }

        if let Some(entries) = env.get("OGC_CACHE_MAX_ENTRIES") {
            config.cache.max_entries = parse_env("OGC_CACHE_MAX_ENTRIES", &entries)?;
        }
        if let Some(ttl) = env.get("OGC_CACHE_TTL") {
            config.cache.ttl_seconds = Some(parse_env("OGC_CACHE_TTL", &ttl)?);
        }

        if let Some(format) = env.get("OGC_OUTPUT_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "tree" => OutputFormat::Tree,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "OGC_OUTPUT_FORMAT must be tree or json, got {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Apply the options given on the command line; unset options keep the
    /// configured value
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(timeout) = cli.timeout {
            config.network.timeout_seconds = timeout;
        }
        if let Some(attempts) = cli.retry_attempts {
            config.network.retry_attempts = attempts;
        }
        if let Some(format) = cli.output_format() {
            config.output.format = format;
        }
        config
    }

    /// Reject settings the client or cache cannot honor
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "timeout must be at least one second".to_string(),
            ));
        }

        if config.network.retry_attempts > 10 {
            return Err(ConfigError::Validation(
                "at most 10 retry attempts are allowed".to_string(),
            ));
        }

        if config.network.max_retry_delay_ms < config.network.retry_delay_ms {
            return Err(ConfigError::Validation(
                "max_retry_delay_ms is shorter than retry_delay_ms".to_string(),
            ));
        }

        if config.cache.max_entries == 0 {
            return Err(ConfigError::Validation(
                "cache max_entries must be positive".to_string(),
            ));
        }

        if config.cache.ttl_seconds == Some(0) {
            return Err(ConfigError::Validation(
                "cache ttl_seconds must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn http_client_config(config: &Config) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        HttpClientConfig {
            timeout_seconds: config.network.timeout_seconds,
            retry_attempts: config.network.retry_attempts,
            retry_delay_ms: config.network.retry_delay_ms,
            max_retry_delay_ms: config.network.max_retry_delay_ms,
            user_agent: config
                .network
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
        }
    }

    pub fn cache_config(config: &Config) -> CacheConfig {
        CacheConfig {
            max_entries: config.cache.max_entries,
            ttl: config.cache.ttl_seconds.map(Duration::from_secs),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ConfigError::Environment(format!("{key} is not a valid number: {value}")))
}
