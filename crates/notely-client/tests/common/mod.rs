//! In-memory `NoteStore` double shared by the client tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio::sync::Notify;

use notely_core::{
    validate_import_payload, Ack, Error, HistoryEntry, Note, NoteId, NoteInput, NoteStore,
    Result, RevisionReply,
};

#[derive(Default)]
pub struct FakeStore {
    notes: Mutex<Vec<Note>>,
    next_id: Mutex<NoteId>,
    calls: Mutex<Vec<String>>,
    pub fail_list: AtomicBool,
    pub fail_append: AtomicBool,
    pub revision_reply: Mutex<String>,
    /// When set, `append_structured_entry` waits on `gate` first.
    pub gated: AtomicBool,
    pub gate: Notify,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            revision_reply: Mutex::new("Revised text.".to_string()),
            ..Self::default()
        }
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        let store = Self::new();
        let max = notes.iter().map(|n| n.id).max().unwrap_or(0);
        *store.next_id.lock().unwrap() = max;
        *store.notes.lock().unwrap() = notes;
        store
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn note(&self, id: NoteId) -> Option<Note> {
        self.notes.lock().unwrap().iter().find(|n| n.id == id).cloned()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn append(&self, id: NoteId, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(Error::Request {
                status: 500,
                message: "database is locked".to_string(),
            });
        }
        let mut notes = self.notes.lock().unwrap();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))?;
        note.ai_history.push(entry);
        Ok(note.ai_history.clone())
    }
}

pub fn note(id: NoteId, title: &str, content: &str, tag: &str) -> Note {
    Note {
        id,
        title: title.to_string(),
        content: content.to_string(),
        tag: tag.to_string(),
        kind: Default::default(),
        prompt_target: None,
        ai_history: Vec::new(),
    }
}

#[async_trait]
impl NoteStore for FakeStore {
    async fn list_notes(&self) -> Result<Vec<Note>> {
        self.record("list_notes");
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".to_string()));
        }
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn create_note(&self, input: NoteInput) -> Result<Note> {
        self.record("create_note");
        let input = input.normalized();
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let created = Note {
            id,
            title: input.title,
            content: input.content,
            tag: input.tag,
            kind: input.kind,
            prompt_target: input.prompt_target,
            ai_history: Vec::new(),
        };
        self.notes.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_note(&self, id: NoteId, input: NoteInput) -> Result<Note> {
        self.record("update_note");
        let input = input.normalized();
        let mut notes = self.notes.lock().unwrap();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))?;
        note.title = input.title;
        note.content = input.content;
        note.tag = input.tag;
        note.kind = input.kind;
        note.prompt_target = input.prompt_target;
        Ok(note.clone())
    }

    async fn delete_note(&self, id: NoteId) -> Result<Ack> {
        self.record("delete_note");
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }
        Ok(Ack {
            message: "Note deleted".to_string(),
            id: Some(id),
        })
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        self.record("search_notes");
        let q = query.to_lowercase();
        Ok(self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.title.to_lowercase().contains(&q))
            .cloned()
            .collect())
    }

    async fn append_structured_entry(
        &self,
        id: NoteId,
        entry: &HistoryEntry,
    ) -> Result<Vec<HistoryEntry>> {
        self.record("append_structured_entry");
        if self.gated.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        self.append(id, entry.clone())
    }

    async fn append_ai_response(&self, id: NoteId, text: &str) -> Result<Vec<HistoryEntry>> {
        self.record("append_ai_response");
        self.append(id, HistoryEntry::ai(text, Utc::now()))
    }

    async fn generate_revision(
        &self,
        id: NoteId,
        _text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<RevisionReply> {
        self.record("generate_revision");
        let reply = self.revision_reply.lock().unwrap().clone();
        self.append(id, HistoryEntry::ai(reply.clone(), timestamp))?;
        Ok(RevisionReply {
            message: "Revision generated".to_string(),
            ai_response: reply,
        })
    }

    async fn full_history(&self, id: NoteId) -> Result<Vec<HistoryEntry>> {
        self.record("full_history");
        self.note(id)
            .map(|n| n.ai_history)
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))
    }

    async fn export_csv(&self) -> Result<String> {
        self.record("export_csv");
        Ok(String::new())
    }

    async fn export_json(&self) -> Result<Vec<Note>> {
        self.record("export_json");
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn import_json(&self, payload: JsonValue) -> Result<Vec<Note>> {
        let records = validate_import_payload(&payload)?;
        self.record("import_json");
        let mut imported = Vec::with_capacity(records.len());
        for record in records {
            let (input, history) = record.into_parts();
            let created = self.create_note(input).await?;
            {
                let mut notes = self.notes.lock().unwrap();
                if let Some(stored) = notes.iter_mut().find(|n| n.id == created.id) {
                    stored.ai_history = history;
                    imported.push(stored.clone());
                }
            }
        }
        Ok(imported)
    }
}
