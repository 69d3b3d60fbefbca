//! Application configuration

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use mv_client::{ClientConfig, StorageFormat, TransferFormat, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "matrix-viewer.json";

/// Overrides the config file location
pub const CONFIG_ENV: &str = "MATRIX_VIEWER_CONFIG";

/// Overrides `backend_url`
pub const BACKEND_URL_ENV: &str = "MATRIX_VIEWER_BACKEND_URL";

/// Settings read at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the matrix backend
    pub backend_url: String,

    /// Request timeout in seconds, no timeout when absent
    pub request_timeout_secs: Option<u64>,

    /// Initial shape in the generate form
    pub default_rows: usize,
    pub default_columns: usize,

    /// Initial format choices in the fetch/store forms
    pub storage_format: StorageFormat,
    pub transfer_format: TransferFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            default_rows: 10,
            default_columns: 10,
            storage_format: StorageFormat::default(),
            transfer_format: TransferFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load from the config file (if any), then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(env::var(BACKEND_URL_ENV).ok());
        Ok(config)
    }

    /// Read a JSON config file; a missing file gives the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, backend_url: Option<String>) {
        if let Some(url) = backend_url.filter(|url| !url.trim().is_empty()) {
            info!("Backend URL overridden to {}", url);
            self.backend_url = url;
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.backend_url.clone(),
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("mv-app-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::from_file(&temp_path("does-not-exist.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.client_config().timeout.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = temp_path("partial.json");
        fs::write(
            &path,
            r#"{"backend_url": "http://matrices:9000", "request_timeout_secs": 30, "storage_format": "tsv"}"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.backend_url, "http://matrices:9000");
        assert_eq!(config.storage_format, StorageFormat::Tsv);
        assert_eq!(config.transfer_format, TransferFormat::Arrow);
        assert_eq!(config.default_rows, 10);
        assert_eq!(config.client_config().timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_path("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let result = AppConfig::from_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_override() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("http://other:8080".to_string()));
        assert_eq!(config.backend_url, "http://other:8080");

        config.apply_overrides(Some("  ".to_string()));
        config.apply_overrides(None);
        assert_eq!(config.backend_url, "http://other:8080");
    }
}
