//! Provider endpoint registry.
//!
//! Maps a note's prompt target to the HTTP endpoint that receives the prompt.
//! The default table covers the text providers; `stable-diffusion` and `sora`
//! are selectable targets without a registered endpoint until configured.
//!
//! ```text
//! gpt-4o      → https://api.openai.com/v1/chat/completions
//! claude      → https://api.anthropic.com/v1/complete
//! gemini      → https://generativelanguage.googleapis.com/v1beta2/models/gemini-pro:generateText
//! perplexity  → https://api.perplexity.ai/v1/query
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use notely_core::{Error, Provider, Result};

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ANTHROPIC_COMPLETE_URL: &str = "https://api.anthropic.com/v1/complete";
pub const GEMINI_GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta2/models/gemini-pro:generateText";
pub const PERPLEXITY_QUERY_URL: &str = "https://api.perplexity.ai/v1/query";

/// Where and as which model a provider is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub url: String,
    /// Value of the `model` field in the request body.
    pub model: String,
}

impl ProviderEndpoint {
    /// Endpoint whose model name is the provider identifier.
    pub fn for_provider(provider: &Provider, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: provider.as_str().to_string(),
        }
    }
}

/// Registry of provider endpoints.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    endpoints: BTreeMap<Provider, ProviderEndpoint>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the default endpoint table.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (provider, url) in [
            (Provider::Gpt4o, OPENAI_CHAT_URL),
            (Provider::Claude, ANTHROPIC_COMPLETE_URL),
            (Provider::Gemini, GEMINI_GENERATE_URL),
            (Provider::Perplexity, PERPLEXITY_QUERY_URL),
        ] {
            let endpoint = ProviderEndpoint::for_provider(&provider, url);
            registry.register(provider, endpoint);
        }
        registry
    }

    /// Register or replace a provider's endpoint.
    pub fn register(&mut self, provider: Provider, endpoint: ProviderEndpoint) {
        debug!(
            subsystem = "inference",
            component = "provider_registry",
            provider = %provider,
            url = %endpoint.url,
            "Registered provider endpoint"
        );
        self.endpoints.insert(provider, endpoint);
    }

    /// Builder form of [`register`](Self::register) keeping the provider id as model.
    pub fn with_endpoint(mut self, provider: Provider, url: impl Into<String>) -> Self {
        let endpoint = ProviderEndpoint::for_provider(&provider, url);
        self.register(provider, endpoint);
        self
    }

    /// Replace endpoint URLs from a `provider id → url` table.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) -> Result<()> {
        for (id, url) in overrides {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "Endpoint for provider {} must be an http(s) URL: {}",
                    id, url
                )));
            }
            let provider = Provider::from(id.as_str());
            let model = self
                .endpoints
                .get(&provider)
                .map(|e| e.model.clone())
                .unwrap_or_else(|| provider.as_str().to_string());
            self.register(
                provider,
                ProviderEndpoint {
                    url: url.clone(),
                    model,
                },
            );
        }
        Ok(())
    }

    /// Endpoint for a prompt target.
    ///
    /// Fails with [`Error::UnknownProvider`] for an absent target or a target
    /// without a registered endpoint.
    pub fn resolve(&self, target: Option<&Provider>) -> Result<&ProviderEndpoint> {
        let provider = target.ok_or_else(|| Error::UnknownProvider("(none)".to_string()))?;
        self.endpoints
            .get(provider)
            .ok_or_else(|| Error::UnknownProvider(provider.to_string()))
    }

    pub fn get(&self, provider: &Provider) -> Option<&ProviderEndpoint> {
        self.endpoints.get(provider)
    }

    /// Providers with a registered endpoint.
    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.endpoints.keys()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
