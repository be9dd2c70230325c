use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;
use super::protocol::ListingKind;

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "FOLIO_API_URL";
/// Environment variable overriding `api.books_url`.
pub const ENV_BOOKS_URL: &str = "FOLIO_BOOKS_URL";
/// Environment variable overriding `api.quotes_url`.
pub const ENV_QUOTES_URL: &str = "FOLIO_QUOTES_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Where each listing variant is fetched from.
///
/// `base_url` applies to both variants unless a per-variant URL is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotes_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Number of items requested per batch (`?count=`).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Request timeout in seconds. 0 disables the timeout.
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub ordering: ResponseOrdering,
}

/// Which response wins when several fetches for the same listing overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Only the most recently issued request may update the listing;
    /// older responses are discarded when they arrive.
    #[default]
    LatestIssued,
    /// Every response is applied in the order it resolves.
    LastResolved,
}

/// Fully resolved settings for one listing controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    pub kind: ListingKind,
    pub base_url: String,
    pub batch_size: usize,
    pub ordering: ResponseOrdering,
}

impl ListingConfig {
    pub fn new(kind: ListingKind, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
            batch_size: default_batch_size(),
            ordering: ResponseOrdering::default(),
        }
    }

    /// `{base_url}/api/{path}?count={batch_size}`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/api/{}?count={}",
            self.base_url.trim_end_matches('/'),
            self.kind.path(),
            self.batch_size
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            books_url: None,
            quotes_url: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            timeout_secs: 0,
            ordering: ResponseOrdering::default(),
        }
    }
}

fn default_base_url() -> String {
    platform::DEFAULT_API_URL.to_string()
}

fn default_batch_size() -> usize {
    10
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Apply `FOLIO_*` environment overrides on top of the file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(url) = get(ENV_BOOKS_URL) {
            self.api.books_url = Some(url);
        }
        if let Some(url) = get(ENV_QUOTES_URL) {
            self.api.quotes_url = Some(url);
        }
        self
    }

    /// Resolve the settings for one listing variant.
    pub fn listing(&self, kind: ListingKind) -> ListingConfig {
        let specific = match kind {
            ListingKind::Books => self.api.books_url.as_ref(),
            ListingKind::Quotes => self.api.quotes_url.as_ref(),
        };
        ListingConfig {
            kind,
            base_url: specific.unwrap_or(&self.api.base_url).clone(),
            batch_size: self.fetch.batch_size,
            ordering: self.fetch.ordering,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.fetch.timeout_secs > 0).then(|| Duration::from_secs(self.fetch.timeout_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.fetch.batch_size, 10);
        assert_eq!(config.fetch.ordering, ResponseOrdering::LatestIssued);
        assert!(config.timeout().is_none());
        assert!(Config::config_path().ends_with("folio/config.toml"));
    }

    #[test]
    fn test_listing_uses_base_url_unless_overridden() {
        let mut config = Config::default();
        config.api.quotes_url = Some("http://quotes.internal:9000".to_string());

        let books = config.listing(ListingKind::Books);
        let quotes = config.listing(ListingKind::Quotes);
        assert_eq!(books.base_url, "http://localhost:8000");
        assert_eq!(quotes.base_url, "http://quotes.internal:9000");
        assert_eq!(books.endpoint(), "http://localhost:8000/api/books?count=10");
        assert_eq!(
            quotes.endpoint(),
            "http://quotes.internal:9000/api/quotes?count=10"
        );
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let cfg = ListingConfig::new(ListingKind::Books, "http://example.test/");
        assert_eq!(cfg.endpoint(), "http://example.test/api/books?count=10");
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_overrides(|key| match key {
            ENV_API_URL => Some("http://api.example".to_string()),
            ENV_BOOKS_URL => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "http://api.example");
        assert!(config.api.books_url.is_none());
        assert_eq!(
            config.listing(ListingKind::Books).base_url,
            "http://api.example"
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [fetch]
            ordering = "last_resolved"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.fetch.batch_size, 10);
        assert_eq!(config.fetch.ordering, ResponseOrdering::LastResolved);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.api.books_url = Some("http://books.example".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.books_url.as_deref(), Some("http://books.example"));
        assert!(loaded.api.quotes_url.is_none());
    }
}
