//! Client configuration.
//!
//! Loaded from `~/.config/notely/client.toml` when present, otherwise from
//! environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `NOTELY_STORE_URL` | `http://127.0.0.1:5000` |
//! | `NOTELY_TIMEOUT` | `30` (seconds) |
//! | `NOTELY_PROVIDER_TIMEOUT` | `120` (seconds) |
//! | `NOTELY_CREDENTIALS` | `~/.config/notely/credentials.toml` |
//!
//! ```toml
//! store_url = "http://127.0.0.1:5000"
//! timeout_secs = 30
//!
//! [providers]
//! claude = "http://localhost:9000/v1/complete"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use notely_core::defaults::{
    CLIENT_CONFIG_FILE, CONFIG_DIR_NAME, CREDENTIALS_FILE, NOTE_STORE_URL, PROVIDER_TIMEOUT_SECS,
    STORE_TIMEOUT_SECS,
};
use notely_core::{Error, Result};
use notely_inference::ProviderRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the Note Store.
    pub store_url: String,
    /// Note Store request timeout in seconds.
    pub timeout_secs: u64,
    /// Provider request timeout in seconds.
    pub provider_timeout_secs: u64,
    /// Credential file; the platform config directory when unset.
    pub credentials_path: Option<PathBuf>,
    /// Endpoint overrides, `provider id → url`.
    pub providers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_url: NOTE_STORE_URL.to_string(),
            timeout_secs: STORE_TIMEOUT_SECS,
            provider_timeout_secs: PROVIDER_TIMEOUT_SECS,
            credentials_path: None,
            providers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// `~/.config/notely` (platform equivalent elsewhere).
    pub fn default_config_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push(CONFIG_DIR_NAME);
        path
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CLIENT_CONFIG_FILE)
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!(
                subsystem = "client",
                component = "config",
                path = %path.display(),
                "Loading client config"
            );
            Self::from_file(&path)
        } else {
            debug!(
                subsystem = "client",
                component = "config",
                path = %path.display(),
                "Config file not found, using environment variables"
            );
            let config = Self::from_env();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            store_url: lookup("NOTELY_STORE_URL").unwrap_or(defaults.store_url),
            timeout_secs: lookup("NOTELY_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            provider_timeout_secs: lookup("NOTELY_PROVIDER_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.provider_timeout_secs),
            credentials_path: lookup("NOTELY_CREDENTIALS").map(PathBuf::from),
            providers: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.store_url.starts_with("http://") || self.store_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "store_url must start with http:// or https://: {}",
                self.store_url
            )));
        }
        if self.timeout_secs == 0 || self.provider_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(|| Self::default_config_dir().join(CREDENTIALS_FILE))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Default endpoint table with this configuration's overrides applied.
    pub fn registry(&self) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::with_defaults();
        registry.apply_overrides(&self.providers)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notely_core::Provider;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.store_url, "http://127.0.0.1:5000");
        assert_eq!(config.store_timeout(), Duration::from_secs(30));
        assert_eq!(config.provider_timeout(), Duration::from_secs(120));
        assert!(config.credentials_path().ends_with("notely/credentials.toml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let vars = HashMap::from([
            ("NOTELY_STORE_URL", "http://store:8080"),
            ("NOTELY_TIMEOUT", "5"),
            ("NOTELY_PROVIDER_TIMEOUT", "not-a-number"),
            ("NOTELY_CREDENTIALS", "/tmp/keys.toml"),
        ]);
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.store_url, "http://store:8080");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.provider_timeout_secs, PROVIDER_TIMEOUT_SECS);
        assert_eq!(config.credentials_path(), PathBuf::from("/tmp/keys.toml"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ClientConfig {
            store_url: "localhost:5000".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file_with_provider_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            concat!(
                "store_url = \"https://notes.example\"\n\n",
                "[providers]\nclaude = \"http://localhost:9000/v1\"\n",
            ),
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.store_url, "https://notes.example");
        assert_eq!(config.timeout_secs, STORE_TIMEOUT_SECS);

        let registry = config.registry().unwrap();
        assert_eq!(
            registry.resolve(Some(&Provider::Claude)).unwrap().url,
            "http://localhost:9000/v1"
        );
    }

    #[test]
    fn test_from_file_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "store_url = ").unwrap();
        assert!(matches!(
            ClientConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }
}
