use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error, info};
use url::Url;

use crate::error::{BotError, Result};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REFRESH_SECS: u64 = 4 * 60 * 60;
const DEFAULT_RETRY_SECS: u64 = 60;
const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;

/// Where a catalog dump or override blob comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Remote(Url),
}

impl DataSource {
    /// `http(s)://` values are URLs, anything else is a path.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL-looking value does not parse.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.starts_with("https://") || value.starts_with("http://") {
            Ok(DataSource::Remote(Url::parse(value)?))
        } else {
            Ok(DataSource::File(PathBuf::from(value)))
        }
    }
}

/// Similarity thresholds used by the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Minimum Jaro-Winkler ratio for a fuzzy modifier hit.
    pub modifier: f64,
    /// Minimum name score for a fuzzy name-token hit.
    pub token: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            modifier: 0.95,
            token: 0.8,
        }
    }
}

/// Everything the monster lookup service needs.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub catalog_source: DataSource,
    pub data_dir: PathBuf,
    pub refresh_interval: Duration,
    pub retry_interval: Duration,
    pub ready_timeout: Duration,
    pub nickname_overrides: Option<DataSource>,
    pub tree_name_overrides: Option<DataSource>,
    pub pantheon_overrides: Option<DataSource>,
    pub journal_path: Option<PathBuf>,
    pub thresholds: MatchThresholds,
}

impl LookupConfig {
    /// Config with defaults for everything but the catalog source.
    #[must_use]
    pub fn new(catalog_source: DataSource, data_dir: PathBuf) -> Self {
        Self {
            catalog_source,
            data_dir,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            retry_interval: Duration::from_secs(DEFAULT_RETRY_SECS),
            ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
            nickname_overrides: None,
            tree_name_overrides: None,
            pantheon_overrides: None,
            journal_path: None,
            thresholds: MatchThresholds::default(),
        }
    }

    /// Path the working copy of the catalog lives at.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("catalog.sqlite")
    }

    /// Parse the lookup settings from any key/value lookup.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Config` when no catalog source is set or a value is malformed.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let catalog_source = match (get("PADBOT_CATALOG_FILE"), get("PADBOT_CATALOG_URL")) {
            (Some(file), _) => DataSource::File(PathBuf::from(file)),
            (None, Some(url)) => DataSource::Remote(Url::parse(&url)?),
            (None, None) => {
                error!("Neither PADBOT_CATALOG_FILE nor PADBOT_CATALOG_URL is set");
                return Err(BotError::Config(
                    "set PADBOT_CATALOG_FILE or PADBOT_CATALOG_URL".to_string(),
                ));
            }
        };

        let data_dir = get("PADBOT_DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let mut config = Self::new(catalog_source, data_dir);

        config.refresh_interval = parse_secs(&get, "PADBOT_REFRESH_SECS", DEFAULT_REFRESH_SECS)?;
        config.retry_interval = parse_secs(&get, "PADBOT_RETRY_SECS", DEFAULT_RETRY_SECS)?;
        config.ready_timeout =
            parse_secs(&get, "PADBOT_READY_TIMEOUT_SECS", DEFAULT_READY_TIMEOUT_SECS)?;

        config.nickname_overrides = get("PADBOT_NICKNAMES")
            .map(|value| DataSource::parse(&value))
            .transpose()?;
        config.tree_name_overrides = get("PADBOT_TREE_NAMES")
            .map(|value| DataSource::parse(&value))
            .transpose()?;
        config.pantheon_overrides = get("PADBOT_PANTHEONS")
            .map(|value| DataSource::parse(&value))
            .transpose()?;
        config.journal_path = get("PADBOT_JOURNAL").map(PathBuf::from);

        let defaults = MatchThresholds::default();
        config.thresholds = MatchThresholds {
            modifier: parse_threshold(&get, "PADBOT_MOD_THRESHOLD", defaults.modifier)?,
            token: parse_threshold(&get, "PADBOT_TOK_THRESHOLD", defaults.token)?,
        };

        debug!("Catalog source: {:?}", config.catalog_source);
        debug!("Data directory: {}", config.data_dir.display());
        debug!(
            "Refresh every {:?}, retry after {:?}",
            config.refresh_interval, config.retry_interval
        );
        Ok(config)
    }
}

fn parse_secs(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    match get(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| BotError::Config(format!("{key} must be a number of seconds: {e}"))),
    }
}

fn parse_threshold(get: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> Result<f64> {
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| BotError::Config(format!("{key} must be a number: {e}")))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(BotError::Config(format!("{key} must be in (0, 1], got {value}")))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub lookup: LookupConfig,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let lookup = LookupConfig::from_vars(|key| env::var(key).ok())?;

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());

        Ok(Self {
            discord_token,
            lookup,
        })
    }
}
