//! Input validation shared by the client and the store.
//!
//! The client runs these checks before issuing a request; the store runs the
//! same checks again on receipt.

use serde_json::Value as JsonValue;

use crate::defaults::DEFAULT_TAG;
use crate::error::{Error, Result};
use crate::models::ImportRecord;

/// Trimmed tag, or the default tag when blank.
pub fn normalize_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Title and content must both be non-empty after trimming.
pub fn validate_note_fields(title: &str, content: &str) -> Result<()> {
    match (title.trim().is_empty(), content.trim().is_empty()) {
        (false, false) => Ok(()),
        (true, true) => Err(Error::Validation(
            "Title and content are required".to_string(),
        )),
        (true, false) => Err(Error::Validation("Title is required".to_string())),
        (false, true) => Err(Error::Validation("Content is required".to_string())),
    }
}

/// Check that an import payload is an array of note-shaped objects and
/// decode it.
///
/// The whole payload is rejected when any element is malformed.
pub fn validate_import_payload(payload: &JsonValue) -> Result<Vec<ImportRecord>> {
    let items = payload.as_array().ok_or_else(|| {
        Error::Validation("Import payload must be a JSON array of notes".to_string())
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(Error::Validation(format!(
                    "Import item {} is not an object",
                    index
                )));
            }
            let record: ImportRecord = serde_json::from_value(item.clone()).map_err(|e| {
                Error::Validation(format!("Import item {} is malformed: {}", index, e))
            })?;
            validate_note_fields(&record.title, &record.content).map_err(|e| match e {
                Error::Validation(msg) => {
                    Error::Validation(format!("Import item {}: {}", index, msg))
                }
                other => other,
            })?;
            Ok(record)
        })
        .collect()
}
