//! Note list state and the actions that mutate it.
//!
//! Every mutation is followed by a full refetch; the held list is replaced
//! wholesale and never patched locally. Each fetch takes a ticket so that a
//! response arriving after a newer one has been applied is dropped.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use notely_core::{
    Ack, Error, Note, NoteDraft, NoteFilter, NoteId, NoteInput, NoteStore, NoteSubmission,
    Result, TagFilter, TypeFilter,
};

use crate::dispatch::{AiDispatcher, DispatchOutcome};
use crate::revision::{RevisionRequest, RevisionStatus};

/// Sequence number of one list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// What happened to a fetched list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// The list replaced the held set.
    Applied { count: usize },
    /// A newer fetch was already applied; the list was dropped.
    Stale,
}

pub struct NoteListController {
    store: Arc<dyn NoteStore>,
    notes: Arc<Vec<Note>>,
    displayed: Vec<Note>,
    filter: NoteFilter,
    next_seq: u64,
    last_applied: Option<u64>,
    editing: Option<NoteDraft>,
}

impl NoteListController {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            store,
            notes: Arc::new(Vec::new()),
            displayed: Vec::new(),
            filter: NoteFilter::default(),
            next_seq: 0,
            last_applied: None,
            editing: None,
        }
    }

    /// The full held set, as last fetched.
    pub fn notes(&self) -> Arc<Vec<Note>> {
        Arc::clone(&self.notes)
    }

    /// The held set after filtering.
    pub fn displayed(&self) -> &[Note] {
        &self.displayed
    }

    pub fn filter(&self) -> &NoteFilter {
        &self.filter
    }

    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Distinct tags of the held set, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.notes
            .iter()
            .map(|n| n.tag.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.refilter();
    }

    pub fn set_tag(&mut self, tag: TagFilter) {
        self.filter.tag = tag;
        self.refilter();
    }

    pub fn set_type(&mut self, kind: TypeFilter) {
        self.filter.kind = kind;
        self.refilter();
    }

    pub fn set_filter(&mut self, filter: NoteFilter) {
        self.filter = filter;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.displayed = self.filter.apply(self.notes.iter());
    }

    // ─── fetching ───────────────────────────────────────────────────────────

    /// Take the next fetch ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_seq += 1;
        FetchTicket(self.next_seq)
    }

    /// Apply a fetched list unless a newer fetch was applied already.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, notes: Vec<Note>) -> RefreshStatus {
        if matches!(self.last_applied, Some(last) if ticket.0 <= last) {
            warn!(
                subsystem = "client",
                component = "controller",
                op = "apply_fetch",
                fetch_seq = ticket.0,
                "Dropping stale note list"
            );
            return RefreshStatus::Stale;
        }

        self.last_applied = Some(ticket.0);
        let count = notes.len();
        self.notes = Arc::new(notes);
        self.refilter();
        self.reseed_editing();

        debug!(
            subsystem = "client",
            component = "controller",
            op = "apply_fetch",
            fetch_seq = ticket.0,
            result_count = count,
            "Note list applied"
        );
        RefreshStatus::Applied { count }
    }

    /// Refetch the full list. On failure the held list is kept.
    pub async fn refresh(&mut self) -> Result<RefreshStatus> {
        let start = Instant::now();
        let ticket = self.begin_fetch();
        let notes = self.store.list_notes().await.map_err(|e| {
            warn!(
                subsystem = "client",
                component = "controller",
                op = "refresh",
                fetch_seq = ticket.0,
                error = %e,
                "Refresh failed, keeping previous list"
            );
            e
        })?;
        let status = self.apply_fetch(ticket, notes);
        debug!(
            subsystem = "client",
            component = "controller",
            op = "refresh",
            duration_ms = start.elapsed().as_millis() as u64,
            "Refresh complete"
        );
        Ok(status)
    }

    /// Refresh after a successful mutation. A failure here is logged; the
    /// mutation itself already happened.
    async fn refresh_after(&mut self, op: &str) {
        if let Err(e) = self.refresh().await {
            warn!(
                subsystem = "client",
                component = "controller",
                op = op,
                error = %e,
                "Mutation succeeded but the list could not be refreshed"
            );
        }
    }

    // ─── editing ────────────────────────────────────────────────────────────

    /// Open the editor on a held note.
    pub fn begin_edit(&mut self, id: NoteId) -> Result<&mut NoteDraft> {
        let draft = self
            .find(id)
            .map(NoteDraft::from_note)
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))?;
        Ok(self.editing.insert(draft))
    }

    pub fn editing(&self) -> Option<&NoteDraft> {
        self.editing.as_ref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Re-seed the open draft from the refreshed note with the same id.
    fn reseed_editing(&mut self) {
        let Some(id) = self.editing.as_ref().and_then(NoteDraft::id) else {
            return;
        };
        self.editing = self
            .notes
            .iter()
            .find(|n| n.id == id)
            .map(NoteDraft::from_note);
    }

    /// Save the open draft and close the editor.
    pub async fn save_edit(&mut self) -> Result<Note> {
        let submission = self
            .editing
            .as_ref()
            .ok_or_else(|| Error::Validation("No note is being edited".to_string()))?
            .save()?;
        let note = self.submit(submission).await?;
        self.editing = None;
        Ok(note)
    }

    // ─── mutations ──────────────────────────────────────────────────────────

    pub async fn create(&mut self, input: NoteInput) -> Result<Note> {
        let note = self.store.create_note(input).await?;
        info!(
            subsystem = "client",
            component = "controller",
            op = "create",
            note_id = note.id,
            "Note created"
        );
        self.refresh_after("create").await;
        Ok(note)
    }

    pub async fn update(&mut self, id: NoteId, input: NoteInput) -> Result<Note> {
        let note = self.store.update_note(id, input).await?;
        info!(
            subsystem = "client",
            component = "controller",
            op = "update",
            note_id = id,
            "Note updated"
        );
        self.refresh_after("update").await;
        Ok(note)
    }

    /// Create or update depending on whether the draft came from a note.
    pub async fn submit(&mut self, submission: NoteSubmission) -> Result<Note> {
        match submission.id {
            Some(id) => self.update(id, submission.input).await,
            None => self.create(submission.input).await,
        }
    }

    /// Delete, refresh, and drop the type filter if it now hides everything.
    pub async fn delete(&mut self, id: NoteId) -> Result<Ack> {
        let ack = self.store.delete_note(id).await?;
        info!(
            subsystem = "client",
            component = "controller",
            op = "delete",
            note_id = id,
            "Note deleted"
        );
        self.refresh_after("delete").await;

        if self.displayed.is_empty() && self.filter.kind != TypeFilter::All {
            self.set_type(TypeFilter::All);
        }
        Ok(ack)
    }

    /// Submit a revision request and refresh when both turns were recorded.
    pub async fn revise(&mut self, request: &RevisionRequest) -> Result<RevisionStatus> {
        let status = request.submit(self.store.as_ref()).await?;
        if matches!(status, RevisionStatus::Submitted(_)) {
            self.refresh_after("revise").await;
        }
        Ok(status)
    }

    /// Dispatch a held note to its provider, then refresh.
    pub async fn send_to_ai(
        &mut self,
        dispatcher: &AiDispatcher,
        id: NoteId,
    ) -> Result<DispatchOutcome> {
        let note = self
            .find(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))?;
        let outcome = dispatcher.dispatch_to_provider(&note).await?;
        self.refresh_after("send_to_ai").await;
        Ok(outcome)
    }
}
