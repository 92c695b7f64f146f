use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::models::SearchType;

/// Environment variable overriding `backend.base_url`.
pub const BACKEND_URL_ENV: &str = "DOCVAULT_BACKEND_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001/api".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Bytes per body chunk; progress is reported once per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    64 * 1024
}

/// Initial values for the session's search options.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default)]
    pub scope: SearchType,
    #[serde(default = "default_fuzzy")]
    pub fuzzy: bool,
    #[serde(default)]
    pub boolean_mode: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scope: SearchType::All,
            fuzzy: default_fuzzy(),
            boolean_mode: false,
        }
    }
}

fn default_fuzzy() -> bool {
    true
}

impl Config {
    /// Defaults used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            backend: BackendConfig::default(),
            upload: UploadConfig::default(),
            search: SearchConfig::default(),
        }
    }

    /// Apply environment overrides (`DOCVAULT_BACKEND_URL`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend.base_url = url.trim().to_string();
            }
        }
        self
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
/// Environment overrides are applied and the result validated either way.
pub fn load_or_default(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        load_config(path)?
    } else {
        Config::minimal()
    };
    let config = config.with_env_overrides();
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    let url = config.backend.base_url.trim();
    if url.is_empty() {
        anyhow::bail!("backend.base_url must not be empty");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!(
            "backend.base_url must start with http:// or https://, got '{}'",
            url
        );
    }

    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be > 0");
    }
    if config.backend.connect_timeout_secs == 0 {
        anyhow::bail!("backend.connect_timeout_secs must be > 0");
    }

    if config.upload.chunk_size == 0 {
        anyhow::bail!("upload.chunk_size must be > 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let cfg: Config = toml::from_str(
            r#"
[backend]
base_url = "https://vault.internal/api/"
timeout_secs = 5

[upload]
chunk_size = 1024

[search]
scope = "keywords"
fuzzy = false
boolean_mode = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.backend.base_url, "https://vault.internal/api/");
        assert_eq!(cfg.backend.timeout_secs, 5);
        assert_eq!(cfg.backend.connect_timeout_secs, 10);
        assert_eq!(cfg.upload.chunk_size, 1024);
        assert_eq!(cfg.search.scope, SearchType::Keywords);
        assert!(!cfg.search.fuzzy);
        assert!(cfg.search.boolean_mode);
        validate(&cfg).unwrap();
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.backend.base_url, "http://localhost:8001/api");
        assert_eq!(cfg.search.scope, SearchType::All);
        assert!(cfg.search.fuzzy);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = Config::minimal();
        cfg.backend.base_url = "ftp://x".into();
        assert!(validate(&cfg).is_err());

        let mut cfg = Config::minimal();
        cfg.upload.chunk_size = 0;
        assert!(validate(&cfg).is_err());

        let mut cfg = Config::minimal();
        cfg.backend.timeout_secs = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_but_bad_file_errors() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("none.toml");
        assert!(load_or_default(&missing).is_ok());

        let bad = tmp.path().join("bad.toml");
        fs::write(&bad, "[search]\nscope = \"everything\"\n").unwrap();
        assert!(load_or_default(&bad).is_err());
    }
}
