use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store: StoreSettings,
    pub contracts_api: ApiSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub notices: NoticeFilterSettings,
    #[serde(default)]
    pub awards: AwardFilterSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    pub max_pages: Option<usize>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: None,
        }
    }
}

// Store fetches batch by the thousand; the contracts API side caps the
// effective size at its own limit of 100.
fn default_page_size() -> usize { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String { "info".to_string() }

/// Notice fetch criteria. Every list defaults to empty, which leaves the
/// corresponding constraint unset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticeFilterSettings {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub include_naics: Vec<String>,
    #[serde(default)]
    pub exclude_naics: Vec<String>,
    #[serde(default)]
    pub include_solicitation_types: Vec<String>,
    #[serde(default)]
    pub exclude_solicitation_types: Vec<String>,
    #[serde(default)]
    pub include_psc: Vec<String>,
    #[serde(default)]
    pub exclude_psc: Vec<String>,
    #[serde(default)]
    pub include_set_aside_ids: Vec<String>,
    #[serde(default)]
    pub exclude_set_aside_ids: Vec<String>,
    #[serde(default)]
    pub include_organization_keys: Vec<String>,
    #[serde(default)]
    pub exclude_organization_keys: Vec<String>,
    pub keyword_query: Option<String>,
}

/// Award fetch criteria.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardFilterSettings {
    #[serde(default)]
    pub include_recipient_uei: Vec<String>,
    #[serde(default)]
    pub exclude_recipient_uei: Vec<String>,
    pub potential_end_date_start: Option<String>,
    pub potential_end_date_end: Option<String>,
    #[serde(default)]
    pub include_naics: Vec<String>,
    #[serde(default)]
    pub exclude_naics: Vec<String>,
    #[serde(default)]
    pub include_psc: Vec<String>,
    #[serde(default)]
    pub exclude_psc: Vec<String>,
    #[serde(default)]
    pub include_set_aside: Vec<String>,
    #[serde(default)]
    pub exclude_set_aside: Vec<String>,
    #[serde(default)]
    pub include_organization_keys: Vec<String>,
    #[serde(default)]
    pub exclude_organization_keys: Vec<String>,
    #[serde(default)]
    pub include_extent_competed: Vec<String>,
    #[serde(default)]
    pub exclude_extent_competed: Vec<String>,
    pub amount_obligated_minimum: Option<f64>,
    pub amount_obligated_maximum: Option<f64>,
    pub keyword_query: Option<String>,
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with OPPTRACK_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with OPPTRACK_)
            // e.g., OPPTRACK_STORE__URL -> store.url
            .add_source(
                Environment::with_prefix("OPPTRACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_credential_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("OPPTRACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the bare credential variables most deployments export directly
/// (STORE_URL, STORE_KEY, CONTRACTS_API_KEY) on top of file and prefixed
/// environment sources.
fn apply_credential_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let store_url = env::var("STORE_URL").ok();
    let store_key = env::var("STORE_KEY").ok();
    let api_key = env::var("CONTRACTS_API_KEY").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = store_url {
        builder = builder.set_override("store.url", url)?;
    }
    if let Some(key) = store_key {
        builder = builder.set_override("store.api_key", key)?;
    }
    if let Some(key) = api_key {
        builder = builder.set_override("contracts_api.api_key", key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fetch_settings() {
        let fetch = FetchSettings::default();
        assert_eq!(fetch.page_size, 1000);
        assert!(fetch.max_pages.is_none());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
    }

    #[test]
    fn test_filter_settings_default_to_unset() {
        let notices = NoticeFilterSettings::default();
        assert!(!notices.active);
        assert!(notices.include_naics.is_empty());
        assert!(notices.keyword_query.is_none());

        let awards = AwardFilterSettings::default();
        assert!(awards.amount_obligated_minimum.is_none());
        assert!(awards.include_recipient_uei.is_empty());
    }
}
