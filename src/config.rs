//! Registry configuration.
//!
//! Loaded from TOML, every section optional, then overridden from the
//! environment:
//!
//! | variable | field |
//! |---|---|
//! | `STORE_REGISTRY_API_BASE` | `remote.api_base` |
//! | `STORE_REGISTRY_STORAGE_PATH` | `storage.path` |
//! | `STORE_REGISTRY_TIMEOUT_MS` | `remote.timeout_ms` |

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::remote::RemoteEndpoints;

pub const ENV_API_BASE: &str = "STORE_REGISTRY_API_BASE";
pub const ENV_STORAGE_PATH: &str = "STORE_REGISTRY_STORAGE_PATH";
pub const ENV_TIMEOUT_MS: &str = "STORE_REGISTRY_TIMEOUT_MS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key holding the aggregate list of every known store.
    pub aggregate_key: String,
    /// Per-store key is this prefix followed by the canonical slug.
    pub record_key_prefix: String,
    /// File-backed storage when set, in-memory otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            aggregate_key: "eshro_stores".into(),
            record_key_prefix: "store_".into(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    /// Tried in order after `api_base`. An empty base means site-relative.
    pub fallback_bases: Vec<String>,
    pub directory_path: String,
    /// Tried after every base has failed the directory fetch.
    pub extra_directory_urls: Vec<String>,
    /// `{slug}` is replaced with the canonical slug.
    pub detail_path: String,
    pub timeout_ms: u64,
    /// Origin used to resolve site-relative URLs over HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_origin: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".into(),
            fallback_bases: vec![String::new()],
            directory_path: "/assets/stores/index.json".into(),
            extra_directory_urls: vec!["/index.json".into()],
            detail_path: "/assets/{slug}/store.json".into(),
            timeout_ms: 10_000,
            site_origin: None,
        }
    }
}

impl RemoteConfig {
    pub fn endpoints(&self) -> RemoteEndpoints {
        let mut endpoints = RemoteEndpoints::new(&self.api_base)
            .with_directory_path(&self.directory_path)
            .with_detail_path(&self.detail_path);
        for base in &self.fallback_bases {
            endpoints = endpoints.with_fallback(base);
        }
        for url in &self.extra_directory_urls {
            endpoints = endpoints.with_extra_directory_url(url);
        }
        endpoints
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Slugs pinned to the front of the storefront listing, in order.
    pub featured: Vec<String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            featured: ["nawaem", "sheirine", "pretty", "delta-store", "magna-beauty"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults. Environment
    /// overrides are applied either way.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw)?,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Blank values are
    /// ignored, invalid values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(base) = read(ENV_API_BASE) {
            self.remote.api_base = base;
        }

        if let Some(path) = read(ENV_STORAGE_PATH) {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = read(ENV_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(value) if value > 0 => self.remote.timeout_ms = value,
                Ok(_) => tracing::warn!("{} must be positive, ignoring", ENV_TIMEOUT_MS),
                Err(err) => tracing::warn!("invalid {}, ignoring: {}", ENV_TIMEOUT_MS, err),
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.aggregate_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.aggregate_key is empty".into()));
        }
        if self.storage.record_key_prefix.is_empty() {
            return Err(ConfigError::Invalid("storage.record_key_prefix is empty".into()));
        }
        if self.storage.aggregate_key.starts_with(&self.storage.record_key_prefix) {
            return Err(ConfigError::Invalid(
                "storage.aggregate_key must not start with storage.record_key_prefix".into(),
            ));
        }
        if !self.remote.detail_path.contains("{slug}") {
            return Err(ConfigError::Invalid(
                "remote.detail_path must contain {slug}".into(),
            ));
        }
        if self.remote.timeout_ms == 0 {
            return Err(ConfigError::Invalid("remote.timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_document_yields_defaults() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.storage.aggregate_key, "eshro_stores");
        assert_eq!(config.remote.fallback_bases, vec![String::new()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RegistryConfig::from_toml_str(
            r#"
            [remote]
            api_base = "https://api.example.ly"
            timeout_ms = 2500

            [listing]
            featured = ["pretty"]
            "#,
        )
        .unwrap();

        assert_eq!(config.remote.api_base, "https://api.example.ly");
        assert_eq!(config.remote.timeout(), Duration::from_millis(2500));
        assert_eq!(config.remote.directory_path, "/assets/stores/index.json");
        assert_eq!(config.listing.featured, vec!["pretty"]);
        assert_eq!(config.storage.record_key_prefix, "store_");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let error = RegistryConfig::from_toml_str(
            r#"
            [remote]
            detail_path = "/assets/store.json"
            "#,
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));

        let error = RegistryConfig::from_toml_str("[storage]\naggregate_key = 3").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistryConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn env_overrides_apply_and_invalid_values_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_API_BASE, " https://stores.example.ly "),
            (ENV_STORAGE_PATH, "/var/lib/stores.json"),
            (ENV_TIMEOUT_MS, "soon"),
        ]);

        let mut config = RegistryConfig::default();
        config.apply_overrides_from(|name| vars.get(name).map(|value| value.to_string()));

        assert_eq!(config.remote.api_base, "https://stores.example.ly");
        assert_eq!(
            config.storage.path.as_deref(),
            Some(Path::new("/var/lib/stores.json"))
        );
        assert_eq!(config.remote.timeout_ms, 10_000);
    }

    #[test]
    fn endpoints_follow_configured_order() {
        let endpoints = RemoteConfig::default().endpoints();
        assert_eq!(
            endpoints.directory_urls(),
            vec![
                "http://localhost:5000/assets/stores/index.json",
                "/assets/stores/index.json",
                "/index.json",
            ]
        );
        assert_eq!(
            endpoints.detail_urls("nawaem"),
            vec![
                "http://localhost:5000/assets/nawaem/store.json",
                "/assets/nawaem/store.json",
            ]
        );
    }
}
