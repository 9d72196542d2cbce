//! Revision requests: a user turn followed by a store-generated AI turn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use notely_core::{HistoryEntry, NoteId, NoteStore, Result, RevisionReply};

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum RevisionStatus {
    /// Blank input; nothing was sent.
    Ignored,
    /// Another submission is still in flight; nothing was sent.
    Busy,
    /// Both turns were recorded.
    Submitted(RevisionReply),
}

/// Revision input box for one note.
///
/// The input is kept on failure and cleared on success.
#[derive(Debug)]
pub struct RevisionRequest {
    note_id: NoteId,
    input: Mutex<String>,
    loading: AtomicBool,
}

impl RevisionRequest {
    pub fn new(note_id: NoteId) -> Self {
        Self {
            note_id,
            input: Mutex::new(String::new()),
            loading: AtomicBool::new(false),
        }
    }

    pub fn with_input(self, text: impl Into<String>) -> Self {
        self.set_input(text);
        self
    }

    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    fn input_guard(&self) -> MutexGuard<'_, String> {
        self.input.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn input(&self) -> String {
        self.input_guard().clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *self.input_guard() = text.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Record the user's text, then ask the store for a revision.
    ///
    /// Both requests share one timestamp. The store records the AI reply.
    pub async fn submit(&self, store: &dyn NoteStore) -> Result<RevisionStatus> {
        let text = self.input();
        if text.trim().is_empty() {
            debug!(
                subsystem = "client",
                component = "revision",
                note_id = self.note_id,
                "Blank revision input ignored"
            );
            return Ok(RevisionStatus::Ignored);
        }
        let Some(_loading) = LoadingGuard::acquire(&self.loading) else {
            return Ok(RevisionStatus::Busy);
        };

        let reply = self.send(store, &text).await?;
        self.input_guard().clear();
        info!(
            subsystem = "client",
            component = "revision",
            op = "submit",
            note_id = self.note_id,
            prompt_len = text.len(),
            response_len = reply.ai_response.len(),
            "Revision recorded"
        );
        Ok(RevisionStatus::Submitted(reply))
    }

    async fn send(&self, store: &dyn NoteStore, text: &str) -> Result<RevisionReply> {
        let timestamp = Utc::now();
        store
            .append_structured_entry(self.note_id, &HistoryEntry::user(text, timestamp))
            .await?;
        store.generate_revision(self.note_id, text, timestamp).await
    }
}

/// Holds the loading flag for one submission; released on drop, including
/// when the submitting future is cancelled.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::SeqCst)).then(|| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
