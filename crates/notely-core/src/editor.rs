//! Local draft state for creating or editing a note.

use crate::error::Result;
use crate::models::{HistoryEntry, Note, NoteId, NoteInput, NoteType, Provider};
use crate::validation::validate_note_fields;

/// Editable copy of a note.
///
/// The draft never touches a note's id, type or history; those are carried
/// through from the note it was seeded from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tag: String,
    pub prompt_target: Option<Provider>,
    kind: NoteType,
    origin: Option<Origin>,
}

#[derive(Debug, Clone, PartialEq)]
struct Origin {
    id: NoteId,
    ai_history: Vec<HistoryEntry>,
}

/// An accepted draft.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSubmission {
    /// `None` for a new note.
    pub id: Option<NoteId>,
    pub input: NoteInput,
    /// History of the edited note, unchanged.
    pub ai_history: Vec<HistoryEntry>,
}

impl NoteDraft {
    /// Empty draft for a new note of the given type.
    pub fn blank(kind: NoteType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            tag: note.tag.clone(),
            prompt_target: note.prompt_target.clone(),
            kind: note.kind,
            origin: Some(Origin {
                id: note.id,
                ai_history: note.ai_history.clone(),
            }),
        }
    }

    pub fn kind(&self) -> NoteType {
        self.kind
    }

    pub fn id(&self) -> Option<NoteId> {
        self.origin.as_ref().map(|o| o.id)
    }

    pub fn is_new(&self) -> bool {
        self.origin.is_none()
    }

    /// Validate and produce the submission. Fails without side effects when
    /// the trimmed title or content is empty.
    pub fn save(&self) -> Result<NoteSubmission> {
        validate_note_fields(&self.title, &self.content)?;

        let input = NoteInput {
            title: self.title.clone(),
            content: self.content.clone(),
            tag: self.tag.clone(),
            kind: self.kind,
            prompt_target: self.prompt_target.clone(),
        }
        .normalized();

        Ok(NoteSubmission {
            id: self.id(),
            input,
            ai_history: self
                .origin
                .as_ref()
                .map(|o| o.ai_history.clone())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::Utc;

    fn prompt_note() -> Note {
        Note {
            id: 7,
            title: "Poem".to_string(),
            content: "Write a poem".to_string(),
            tag: "fun".to_string(),
            kind: NoteType::Prompt,
            prompt_target: Some(Provider::Claude),
            ai_history: vec![HistoryEntry::ai("roses", Utc::now())],
        }
    }

    #[test]
    fn test_edit_preserves_id_type_and_history() {
        let note = prompt_note();
        let mut draft = NoteDraft::from_note(&note);
        draft.title = "Better poem".to_string();

        let submission = draft.save().unwrap();
        assert_eq!(submission.id, Some(7));
        assert_eq!(submission.input.kind, NoteType::Prompt);
        assert_eq!(submission.input.title, "Better poem");
        assert_eq!(submission.input.prompt_target, Some(Provider::Claude));
        assert_eq!(submission.ai_history, note.ai_history);
    }

    #[test]
    fn test_save_rejects_blank_fields() {
        let mut draft = NoteDraft::from_note(&prompt_note());
        draft.content = "   ".to_string();
        assert!(matches!(draft.save(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_blank_draft_normalizes_tag() {
        let mut draft = NoteDraft::blank(NoteType::Normal);
        draft.title = "t".to_string();
        draft.content = "c".to_string();
        draft.prompt_target = Some(Provider::Gemini);

        let submission = draft.save().unwrap();
        assert!(draft.is_new());
        assert_eq!(submission.id, None);
        assert_eq!(submission.input.tag, "unclassified");
        assert_eq!(submission.input.prompt_target, None);
        assert!(submission.ai_history.is_empty());
    }
}
