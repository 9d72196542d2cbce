//! One-shot prompt dispatch to a third-party provider.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use notely_core::defaults::PROVIDER_TIMEOUT_SECS;
use notely_core::{Error, Result};

use crate::provider::ProviderEndpoint;

/// Body posted to a provider endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
}

/// Reply text of a provider response: the string `response` field when
/// present, otherwise the whole body serialized.
pub fn extract_reply(body: &JsonValue) -> String {
    match body.get("response") {
        Some(JsonValue::String(text)) => text.clone(),
        _ => body.to_string(),
    }
}

/// HTTP client for provider endpoints.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
}

impl ProviderClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create with the default provider timeout.
    pub fn with_defaults() -> Result<Self> {
        Self::new(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
    }

    /// Send `prompt` to the endpoint with bearer authentication and return
    /// the reply text.
    pub async fn send(
        &self,
        endpoint: &ProviderEndpoint,
        api_key: &str,
        prompt: &str,
    ) -> Result<String> {
        let start = Instant::now();
        debug!(
            subsystem = "inference",
            component = "provider_client",
            op = "send",
            url = %endpoint.url,
            model = %endpoint.model,
            prompt_len = prompt.len(),
            "Dispatching prompt"
        );

        let response = self
            .client
            .post(&endpoint.url)
            .bearer_auth(api_key)
            .json(&ProviderRequest {
                prompt,
                model: &endpoint.model,
            })
            .send()
            .await
            .map_err(|e| Error::Network(format!("Provider request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read provider response: {}", e)))?;

        if !status.is_success() {
            warn!(
                subsystem = "inference",
                component = "provider_client",
                op = "send",
                model = %endpoint.model,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Provider returned error status"
            );
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(Error::Request {
                status: status.as_u16(),
                message,
            });
        }

        let json: JsonValue = serde_json::from_str(&body)?;
        let reply = extract_reply(&json);

        debug!(
            subsystem = "inference",
            component = "provider_client",
            op = "send",
            model = %endpoint.model,
            response_len = reply.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Provider replied"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_reply_prefers_response_field() {
        assert_eq!(extract_reply(&json!({"response": "hi", "id": 1})), "hi");
    }

    #[test]
    fn test_extract_reply_falls_back_to_body() {
        let body = json!({"choices": [{"text": "hi"}]});
        assert_eq!(extract_reply(&body), body.to_string());
        assert_eq!(extract_reply(&json!({"response": 5})), r#"{"response":5}"#);
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ProviderRequest {
            prompt: "hello",
            model: "claude",
        })
        .unwrap();
        assert_eq!(body, json!({"prompt": "hello", "model": "claude"}));
    }
}
