use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::domain::SpectrumType;
use crate::error::ScrapeError;
use crate::nist::{ClientSettings, DEFAULT_BASE_URL};
use crate::search::SearchFlags;
use crate::store::Store;
use crate::transport::RetryPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "nist-scrape.json";
pub const DEFAULT_SPECIES_FILE: &str = "species.txt";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub structure_dir: Option<String>,
    #[serde(default)]
    pub spectrum_dir: Option<String>,
    #[serde(default)]
    pub spectrum_types: Option<Vec<String>>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub search: Option<SearchFlags>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RetryConfig {
    #[serde(default)]
    pub max_retries: Option<usize>,
    #[serde(default)]
    pub backoff_base_ms: Option<u64>,
    #[serde(default)]
    pub backoff_max_ms: Option<u64>,
    #[serde(default)]
    pub retryable_statuses: Option<Vec<u16>>,
    #[serde(default)]
    pub retryable_methods: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub species_path: Utf8PathBuf,
    pub store: Store,
    pub spectrum_types: Vec<SpectrumType>,
    pub search: SearchFlags,
    pub client: ClientSettings,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Without an explicit path a missing `nist-scrape.json` means defaults;
    /// an explicit path must exist.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ScrapeError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ScrapeError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ScrapeError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ScrapeError> {
        let retry = match config.retry {
            Some(retry) => resolve_retry(retry)?,
            None => RetryPolicy::default(),
        };

        let spectrum_types = match config.spectrum_types {
            Some(values) => values
                .iter()
                .map(|value| value.parse::<SpectrumType>())
                .collect::<Result<Vec<_>, ScrapeError>>()?,
            None => vec![SpectrumType::Ir],
        };

        let store = Store::new(
            Utf8PathBuf::from(config.structure_dir.unwrap_or_else(|| "mol".to_string())),
            Utf8PathBuf::from(config.spectrum_dir.unwrap_or_else(|| "jdx".to_string())),
        );

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            species_path: Utf8PathBuf::from(
                config
                    .species
                    .unwrap_or_else(|| DEFAULT_SPECIES_FILE.to_string()),
            ),
            store,
            spectrum_types,
            search: config.search.unwrap_or_else(SearchFlags::driver_defaults),
            client: ClientSettings {
                base_url: config
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout: config.timeout_secs.map(Duration::from_secs),
                retry,
            },
        })
    }
}

fn resolve_retry(config: RetryConfig) -> Result<RetryPolicy, ScrapeError> {
    let defaults = RetryPolicy::default();
    let retryable_methods = match config.retryable_methods {
        Some(methods) => methods
            .iter()
            .map(|value| {
                Method::from_bytes(value.trim().to_ascii_uppercase().as_bytes())
                    .map_err(|_| ScrapeError::InvalidMethod(value.clone()))
            })
            .collect::<Result<Vec<_>, ScrapeError>>()?,
        None => defaults.retryable_methods,
    };

    Ok(RetryPolicy {
        max_retries: config.max_retries.unwrap_or(defaults.max_retries),
        backoff_base: config
            .backoff_base_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.backoff_base),
        backoff_max: config
            .backoff_max_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.backoff_max),
        retryable_statuses: config
            .retryable_statuses
            .unwrap_or(defaults.retryable_statuses),
        retryable_methods,
    })
}
