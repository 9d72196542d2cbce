//! # notely-inference
//!
//! AI backends for notely.
//!
//! This crate provides:
//! - The provider endpoint registry used to route prompt notes
//! - A single-request provider client (bearer auth, `{prompt, model}` body)
//! - An OpenAI-compatible generation backend for store-side revisions
//!   (feature `openai`, on by default)
//! - A deterministic mock backend (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use notely_core::Provider;
//! use notely_inference::{ProviderClient, ProviderRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = ProviderRegistry::with_defaults();
//!     let client = ProviderClient::with_defaults().unwrap();
//!     let endpoint = registry.resolve(Some(&Provider::Claude)).unwrap();
//!     let reply = client.send(endpoint, "sk-...", "Write a haiku").await.unwrap();
//!     println!("{}", reply);
//! }
//! ```

pub mod dispatch;
pub mod provider;

#[cfg(feature = "openai")]
pub mod openai;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use dispatch::{extract_reply, ProviderClient, ProviderRequest};
pub use provider::{ProviderEndpoint, ProviderRegistry};

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerationBackend;
