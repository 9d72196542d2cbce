//! Chat completions client used by the store to generate revisions.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use notely_core::defaults::REVISION_MODEL;
use notely_core::{Error, GenerationBackend, Result};

use super::error::Rejection;
use super::types::*;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_GEN_MODEL: &str = REVISION_MODEL;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Where revisions are generated and with which model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    /// API root; `/chat/completions` is appended.
    pub base_url: String,
    /// Sent as a bearer token when present. Local servers usually need none.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_GEN_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenAIConfig {
    /// Settings from `OPENAI_BASE_URL`, `OPENAI_API_KEY`, `OPENAI_GEN_MODEL`
    /// and `OPENAI_TIMEOUT` (seconds).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: set("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: set("OPENAI_API_KEY"),
            model: set("OPENAI_GEN_MODEL").unwrap_or(defaults.model),
            timeout: set("OPENAI_TIMEOUT")
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// [`GenerationBackend`] over an OpenAI-compatible chat completions API.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Inference(format!("Could not build HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            url = %config.chat_url(),
            model = %config.model,
            has_api_key = config.api_key.is_some(),
            "Revision backend ready"
        );
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Read the provider's error body, falling back to the bare status.
    async fn rejection(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let (message, kind) = match response.json::<ErrorEnvelope>().await {
            Ok(body) => (body.error.message, body.error.kind),
            Err(_) => (format!("HTTP {}", status), String::new()),
        };

        warn!(
            subsystem = "inference",
            component = "openai",
            op = "generate",
            status,
            error = %message,
            "Chat completion rejected"
        );
        Rejection::classify(status, &kind).into_error(&message)
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let messages = (!system.is_empty())
            .then(|| ChatMessage::system(system))
            .into_iter()
            .chain(std::iter::once(ChatMessage::user(prompt)))
            .collect();
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
        };

        let mut request = self.client.post(self.config.chat_url()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Chat completion not sent: {}", e)))?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Unreadable chat completion: {}", e)))?;
        let reply = completion
            .into_text()
            .ok_or_else(|| Error::Inference("Model returned an empty response".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "generate",
            model = %self.config.model,
            prompt_len = prompt.len(),
            response_len = reply.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion received"
        );
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
