//! OpenAI-compatible generation backend.
//!
//! Works with any endpoint that speaks the chat completions protocol
//! (OpenAI, Azure OpenAI, Ollama in compatibility mode, vLLM).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use notely_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use notely_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::new(OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         api_key: None,
//!         model: "llama3".to_string(),
//!         timeout: Duration::from_secs(120),
//!     })
//!     .unwrap();
//!
//!     let revised = backend
//!         .generate_with_system("Improve the prompt.", "write poem")
//!         .await
//!         .unwrap();
//!     println!("{}", revised);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS,
};
pub use error::Rejection;
pub use types::*;
