//! Scripted [`GenerationBackend`] for tests.
//!
//! ```rust,ignore
//! let backend = MockGenerationBackend::new().with_response_mapping("fix grammar", "A. B.");
//! assert_eq!(backend.generate("fix grammar").await?, "A. B.");
//! assert_eq!(backend.call_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use notely_core::{Error, GenerationBackend, Result};

/// What an unmapped prompt gets back.
#[derive(Debug, Clone)]
enum Fallback {
    Reply(String),
    Fail(String),
}

/// Clones share one call log, so a test can keep a handle after moving the
/// backend into the store.
#[derive(Debug, Clone)]
pub struct MockGenerationBackend {
    model: String,
    replies: HashMap<String, String>,
    fallback: Fallback,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            replies: HashMap::new(),
            fallback: Fallback::Reply("Mock response".to_string()),
            calls: Arc::default(),
        }
    }

    /// Reply for every prompt without a mapping.
    pub fn with_fixed_response(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Fallback::Reply(reply.into());
        self
    }

    pub fn with_response_mapping(
        mut self,
        prompt: impl Into<String>,
        reply: impl Into<String>,
    ) -> Self {
        self.replies.insert(prompt.into(), reply.into());
        self
    }

    /// Every call fails with [`Error::Inference`], mapped prompts included.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fallback = Fallback::Fail(message.into());
        self.replies.clear();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn calls(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    pub fn clear_calls(&self) {
        self.calls().clear()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.calls().push(MockCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        match (self.replies.get(prompt), &self.fallback) {
            (Some(reply), _) => Ok(reply.clone()),
            (None, Fallback::Reply(reply)) => Ok(reply.clone()),
            (None, Fallback::Fail(message)) => Err(Error::Inference(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_calls_are_shared_between_clones() {
        let backend = MockGenerationBackend::new().with_fixed_response("done");
        let handle = backend.clone();
        let reply = backend.generate_with_system("sys", "fix grammar").await.unwrap();

        assert_eq!(reply, "done");
        assert_eq!(
            handle.get_calls(),
            vec![MockCall {
                system: "sys".into(),
                prompt: "fix grammar".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_mapping_wins_over_fallback() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response("default")
            .with_response_mapping("a", "mapped");
        assert_eq!(backend.generate("a").await.unwrap(), "mapped");
        assert_eq!(backend.generate("b").await.unwrap(), "default");
        assert_eq!(backend.call_count(), 2);
        backend.clear_calls();
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_recorded() {
        let backend = MockGenerationBackend::new()
            .with_response_mapping("x", "never")
            .with_failure("offline");
        assert!(matches!(
            backend.generate("x").await,
            Err(Error::Inference(ref m)) if m == "offline"
        ));
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.with_model("m2").model_name(), "m2");
    }
}
