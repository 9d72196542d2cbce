//! Client-side note list filtering.
//!
//! Three independent predicates combined by conjunction: title substring
//! (case-insensitive), exact tag, exact type.

use serde::{Deserialize, Serialize};

use crate::models::{Note, NoteType};

/// Tag predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TagFilter {
    #[default]
    All,
    Exact(String),
}

impl TagFilter {
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => wanted == tag,
        }
    }
}

/// Type predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Exact(NoteType),
}

impl TypeFilter {
    pub fn matches(&self, kind: NoteType) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => *wanted == kind,
        }
    }
}

/// Current filter state of the note list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteFilter {
    pub query: String,
    pub tag: TagFilter,
    pub kind: TypeFilter,
}

impl NoteFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_tag(mut self, tag: TagFilter) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_kind(mut self, kind: TypeFilter) -> Self {
        self.kind = kind;
        self
    }

    /// Empty (after trimming) queries match every title.
    pub fn matches_query(&self, title: &str) -> bool {
        let query = self.query.trim();
        query.is_empty() || title.to_lowercase().contains(&query.to_lowercase())
    }

    pub fn matches(&self, note: &Note) -> bool {
        self.matches_query(&note.title)
            && self.tag.matches(&note.tag)
            && self.kind.matches(note.kind)
    }

    /// Matching notes in their original order.
    pub fn apply<'a, I>(&self, notes: I) -> Vec<Note>
    where
        I: IntoIterator<Item = &'a Note>,
    {
        notes
            .into_iter()
            .filter(|note| self.matches(note))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.tag == TagFilter::All && self.kind == TypeFilter::All
    }
}
