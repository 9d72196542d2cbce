//! Per-provider API key storage.
//!
//! Keys live in a flat TOML table under `apiKey_<provider>` names:
//!
//! ```toml
//! apiKey_gpt-4o = "sk-..."
//! apiKey_claude = "sk-ant-..."
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use notely_core::defaults::CREDENTIAL_KEY_PREFIX;
use notely_core::{CredentialResolver, Provider};

/// Errors reading or writing the credential file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read credentials file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write credentials file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credentials file {path} is not a valid key table: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("API key for {0} must not be empty")]
    EmptyKey(String),
}

impl From<SettingsError> for notely_core::Error {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::EmptyKey(_) => notely_core::Error::Validation(e.to_string()),
            SettingsError::Parse { .. } => notely_core::Error::Config(e.to_string()),
            SettingsError::Read { ref source, .. } | SettingsError::Write { ref source, .. } => {
                notely_core::Error::Io(std::io::Error::new(source.kind(), e.to_string()))
            }
        }
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&raw).map_err(|e| SettingsError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };

        debug!(
            subsystem = "client",
            component = "settings",
            path = %path.display(),
            entries = entries.len(),
            "Opened credential store"
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Key for a provider; empty values count as unset.
    pub fn get(&self, provider: &Provider) -> Option<&str> {
        self.entries
            .get(&provider.credential_key())
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
    }

    /// Store a key and persist the file.
    pub fn set(&mut self, provider: &Provider, key: &str) -> Result<(), SettingsError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SettingsError::EmptyKey(provider.to_string()));
        }
        self.entries
            .insert(provider.credential_key(), key.to_string());
        self.persist()?;
        info!(
            subsystem = "client",
            component = "settings",
            op = "set",
            provider = %provider,
            "API key saved"
        );
        Ok(())
    }

    /// Remove a key. Returns whether one was present.
    pub fn remove(&mut self, provider: &Provider) -> Result<bool, SettingsError> {
        let removed = self.entries.remove(&provider.credential_key()).is_some();
        if removed {
            self.persist()?;
            info!(
                subsystem = "client",
                component = "settings",
                op = "remove",
                provider = %provider,
                "API key removed"
            );
        }
        Ok(removed)
    }

    /// Providers with a non-empty key, in name order.
    pub fn configured(&self) -> Vec<Provider> {
        self.entries
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .filter_map(|(k, _)| k.strip_prefix(CREDENTIAL_KEY_PREFIX))
            .map(Provider::from)
            .collect()
    }

    /// Write to a sibling temp file, then rename over the store.
    fn persist(&self) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let body = toml::to_string(&self.entries).map_err(|e| SettingsError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, body).map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600)).map_err(write_err)?;
        }
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl CredentialResolver for CredentialStore {
    fn resolve_credential(&self, provider: &Provider) -> Option<String> {
        self.get(provider).map(str::to_string)
    }
}

/// In-memory credentials.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    keys: BTreeMap<Provider, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        self.keys.insert(provider, key.into());
        self
    }
}

impl CredentialResolver for StaticCredentials {
    fn resolve_credential(&self, provider: &Provider) -> Option<String> {
        self.keys
            .get(provider)
            .filter(|k| !k.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("credentials.toml")).unwrap();
        assert!(store.configured().is_empty());
        assert_eq!(store.get(&Provider::Gpt4o), None);
    }

    #[test]
    fn test_set_persists_under_prefixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let mut store = CredentialStore::open(&path).unwrap();
        store.set(&Provider::Gpt4o, " sk-123 ").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("apiKey_gpt-4o"));
        assert!(raw.contains("sk-123"));
        assert!(!path.with_extension("toml.tmp").exists());

        let reopened = CredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get(&Provider::Gpt4o), Some("sk-123"));
        assert_eq!(reopened.configured(), vec![Provider::Gpt4o]);
    }

    #[test]
    fn test_remove_and_empty_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "apiKey_claude = \"sk-ant\"\napiKey_gemini = \"\"\n").unwrap();

        let mut store = CredentialStore::open(&path).unwrap();
        assert_eq!(store.configured(), vec![Provider::Claude]);
        assert_eq!(store.resolve_credential(&Provider::Gemini), None);

        assert!(store.remove(&Provider::Claude).unwrap());
        assert!(!store.remove(&Provider::Claude).unwrap());
        assert!(CredentialStore::open(&path).unwrap().configured().is_empty());
    }

    #[test]
    fn test_set_rejects_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::open(dir.path().join("c.toml")).unwrap();
        assert!(matches!(
            store.set(&Provider::Sora, "  "),
            Err(SettingsError::EmptyKey(_))
        ));
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        fs::write(&path, "apiKey_claude = [1, 2]").unwrap();

        let err = CredentialStore::open(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(matches!(
            notely_core::Error::from(err),
            notely_core::Error::Config(_)
        ));
    }

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::new()
            .with_key(Provider::Claude, "k")
            .with_key(Provider::Gemini, "");
        assert_eq!(creds.resolve_credential(&Provider::Claude), Some("k".into()));
        assert_eq!(creds.resolve_credential(&Provider::Gemini), None);
        assert_eq!(creds.resolve_credential(&Provider::Gpt4o), None);
    }
}
