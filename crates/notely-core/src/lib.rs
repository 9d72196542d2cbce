//! # notely-core
//!
//! Core types, traits, and abstractions for the notely note-taking system.
//!
//! This crate provides the note and AI-history data model, the error taxonomy
//! shared by client and store, and the pure view/editor logic that the
//! front end builds on. Nothing here performs I/O.

pub mod defaults;
pub mod editor;
pub mod error;
pub mod filter;
pub mod history;
pub mod logging;
pub mod models;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use editor::{NoteDraft, NoteSubmission};
pub use error::{Error, Result};
pub use filter::{NoteFilter, TagFilter, TypeFilter};
pub use history::{format_timestamp, HistoryView};
pub use models::*;
pub use traits::*;
pub use validation::{normalize_tag, validate_import_payload, validate_note_fields};
