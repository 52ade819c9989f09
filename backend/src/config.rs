//! # Configuration
//!
//! Settings are resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `ride_ledger.yaml` in the data directory, if present
//! 3. Environment variables
//!
//! ## YAML Format
//!
//! ```yaml
//! bind_address: "127.0.0.1:3000"
//! storage_backend: file        # or: sqlite
//! cors_origin: "http://localhost:8080"
//! insight:
//!   model: "gemini-2.5-flash"
//!   timeout_secs: 15
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Setting |
//! |---|---|
//! | `RIDE_LEDGER_DATA_DIR` | data directory |
//! | `RIDE_LEDGER_ADDR` | bind address |
//! | `RIDE_LEDGER_STORAGE` | `file` or `sqlite` |
//! | `RIDE_LEDGER_CORS_ORIGIN` | allowed frontend origin |
//! | `GEMINI_API_KEY` | insight API key |
//! | `RIDE_LEDGER_INSIGHT_MODEL` | insight model name |
//! | `RIDE_LEDGER_STATIC_DIR` | built frontend to serve outside `/api` |

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "ride_ledger.yaml";
const DATA_DIRECTORY_NAME: &str = "Ride Ledger";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Never written to the YAML file by this application; usually from the environment
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub data_directory: PathBuf,
    pub storage_backend: StorageBackend,
    pub cors_origin: String,
    /// When set, files in this directory are served for every non-API path
    pub static_directory: Option<PathBuf>,
    pub insight: InsightConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            data_directory: default_data_directory(),
            storage_backend: StorageBackend::File,
            cors_origin: "http://localhost:8080".to_string(),
            static_directory: None,
            insight: InsightConfig::default(),
        }
    }
}

/// `~/Documents/Ride Ledger`, or the home directory when there is no Documents folder
pub fn default_data_directory() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIRECTORY_NAME)
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load configuration, reading variables through `env`
    pub fn load_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_directory = env("RIDE_LEDGER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_directory);

        let mut config = Self::read_file(&data_directory.join(CONFIG_FILE_NAME))
            .unwrap_or_default();
        config.data_directory = data_directory;

        if let Some(addr) = env("RIDE_LEDGER_ADDR") {
            config.bind_address = addr;
        }
        if let Some(backend) = env("RIDE_LEDGER_STORAGE") {
            config.storage_backend = match backend.trim().to_lowercase().as_str() {
                "file" => StorageBackend::File,
                "sqlite" => StorageBackend::Sqlite,
                other => anyhow::bail!("Unknown storage backend '{}'", other),
            };
        }
        if let Some(origin) = env("RIDE_LEDGER_CORS_ORIGIN") {
            config.cors_origin = origin;
        }
        if let Some(dir) = env("RIDE_LEDGER_STATIC_DIR") {
            config.static_directory = Some(PathBuf::from(dir));
        }
        if let Some(key) = env("GEMINI_API_KEY") {
            config.insight.api_key = Some(key);
        }
        if let Some(model) = env("RIDE_LEDGER_INSIGHT_MODEL") {
            config.insight.model = model;
        }

        Ok(config)
    }

    /// Read the YAML file; a missing or unreadable file yields `None`
    fn read_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let parsed = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| {
                serde_yaml::from_str::<Self>(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))
            });

        match parsed {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                Some(config)
            }
            Err(e) => {
                warn!("{:#}. Using default configuration.", e);
                None
            }
        }
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_directory.join("ride_ledger.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_string_lossy().to_string();

        let config = AppConfig::load_with(env_from(&[("RIDE_LEDGER_DATA_DIR", &dir)])).unwrap();

        assert_eq!(config.data_directory, temp_dir.path());
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.insight.api_key, None);
        assert_eq!(config.static_directory, None);
    }

    #[test]
    fn test_yaml_file_then_env_overrides() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "bind_address: \"0.0.0.0:4000\"\nstorage_backend: sqlite\ninsight:\n  timeout_secs: 5\n",
        )
        .unwrap();
        let dir = temp_dir.path().to_string_lossy().to_string();

        let config = AppConfig::load_with(env_from(&[
            ("RIDE_LEDGER_DATA_DIR", &dir),
            ("RIDE_LEDGER_ADDR", "127.0.0.1:5000"),
            ("GEMINI_API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:5000");
        assert_eq!(config.storage_backend, StorageBackend::Sqlite);
        assert_eq!(config.insight.timeout_secs, 5);
        assert_eq!(config.insight.model, "gemini-2.5-flash");
        assert_eq!(config.insight.api_key.as_deref(), Some("secret"));
        assert_eq!(config.sqlite_path(), temp_dir.path().join("ride_ledger.db"));
    }

    #[test]
    fn test_malformed_yaml_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "bind_address: [unclosed").unwrap();
        let dir = temp_dir.path().to_string_lossy().to_string();

        let config = AppConfig::load_with(env_from(&[("RIDE_LEDGER_DATA_DIR", &dir)])).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_unknown_storage_backend_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_string_lossy().to_string();
        let result = AppConfig::load_with(env_from(&[
            ("RIDE_LEDGER_DATA_DIR", &dir),
            ("RIDE_LEDGER_STORAGE", "postgres"),
        ]));
        assert!(result.is_err());
    }
}
