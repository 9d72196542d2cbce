//! Seams between the front end, the store, and the model backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE STORE (CLIENT SIDE)
// =============================================================================

/// The Note Store as seen by the front end.
///
/// Implemented over HTTP by `notely_client::NoteStoreClient`; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Fetch every note. Each note carries a defined (possibly empty) history.
    async fn list_notes(&self) -> Result<Vec<Note>>;

    /// Create a note. Rejects empty title/content before any request.
    async fn create_note(&self, input: NoteInput) -> Result<Note>;

    /// Replace a note's editable fields.
    async fn update_note(&self, id: NoteId, input: NoteInput) -> Result<Note>;

    /// Delete a note together with its history.
    async fn delete_note(&self, id: NoteId) -> Result<Ack>;

    /// Server-side substring search over title, content and tag.
    async fn search_notes(&self, query: &str) -> Result<Vec<Note>>;

    /// Append a `{role, text, timestamp}` entry. Returns the stored history.
    async fn append_structured_entry(
        &self,
        id: NoteId,
        entry: &HistoryEntry,
    ) -> Result<Vec<HistoryEntry>>;

    /// Append a bare `{response}` AI reply. Returns the stored history.
    async fn append_ai_response(&self, id: NoteId, text: &str) -> Result<Vec<HistoryEntry>>;

    /// Ask the store to generate a revision of `text`; the store records the
    /// AI entry itself.
    async fn generate_revision(
        &self,
        id: NoteId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<RevisionReply>;

    /// The complete, unclipped history of a note.
    async fn full_history(&self, id: NoteId) -> Result<Vec<HistoryEntry>>;

    /// CSV export of every note.
    async fn export_csv(&self) -> Result<String>;

    /// JSON export of every note.
    async fn export_json(&self) -> Result<Vec<Note>>;

    /// Bulk import. The payload must be an array of objects.
    async fn import_json(&self, payload: JsonValue) -> Result<Vec<Note>>;
}

// =============================================================================
// NOTE REPOSITORY (STORE SIDE)
// =============================================================================

/// Persistence for notes and their histories.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note with an empty history.
    async fn insert(&self, input: NoteInput) -> Result<Note>;

    /// Insert multiple notes in a single transaction, keeping their histories.
    async fn insert_bulk(&self, records: Vec<ImportRecord>) -> Result<Vec<Note>>;

    /// Fetch a note by id.
    async fn fetch(&self, id: NoteId) -> Result<Note>;

    /// All notes in id order.
    async fn list(&self) -> Result<Vec<Note>>;

    /// Case-insensitive substring match over title, content and tag.
    async fn search(&self, query: &str) -> Result<Vec<Note>>;

    /// Replace a note's editable fields. History is untouched.
    async fn update(&self, id: NoteId, input: NoteInput) -> Result<Note>;

    /// Delete a note and its history.
    async fn delete(&self, id: NoteId) -> Result<()>;

    /// Append one entry and return the resulting history.
    async fn append_entry(&self, id: NoteId, entry: HistoryEntry) -> Result<Vec<HistoryEntry>>;

    /// The stored history of a note.
    async fn history(&self, id: NoteId) -> Result<Vec<HistoryEntry>>;
}

// =============================================================================
// INFERENCE
// =============================================================================

/// Model used by the store to produce revisions.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// An empty `system` sends the prompt alone.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Looks up the API key for a provider.
///
/// `None` (or an empty key) means the provider is not configured.
pub trait CredentialResolver: Send + Sync {
    fn resolve_credential(&self, provider: &Provider) -> Option<String>;
}
