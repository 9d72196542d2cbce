//! # notely-client
//!
//! Front-end side of notely.
//!
//! This crate provides:
//! - [`NoteStoreClient`]: the HTTP client for the Note Store
//! - [`NoteListController`]: the held note list, its filters and the
//!   mutate-then-refetch actions
//! - [`RevisionRequest`]: the two-step revision protocol
//! - [`AiDispatcher`]: prompt dispatch to a provider and reply recording
//! - [`CredentialStore`]: per-provider API keys on disk
//! - [`ClientConfig`]: store URL, timeouts and endpoint overrides
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notely_client::{ClientConfig, NoteListController, NoteStoreClient};
//!
//! #[tokio::main]
//! async fn main() -> notely_core::Result<()> {
//!     let config = ClientConfig::load()?;
//!     let store = Arc::new(NoteStoreClient::from_config(&config)?);
//!
//!     let mut controller = NoteListController::new(store);
//!     controller.refresh().await?;
//!     controller.set_query("poem");
//!     for note in controller.displayed() {
//!         println!("{} {}", note.id, note.display_title());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod notify;
pub mod revision;
pub mod settings;

pub use client::NoteStoreClient;
pub use config::ClientConfig;
pub use controller::{FetchTicket, NoteListController, RefreshStatus};
pub use dispatch::{AiDispatcher, DispatchOutcome};
pub use notify::{Notification, NotificationLevel};
pub use revision::{RevisionRequest, RevisionStatus};
pub use settings::{CredentialStore, SettingsError, StaticCredentials};
