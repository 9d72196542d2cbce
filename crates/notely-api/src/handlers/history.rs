//! Conversation history and revision handlers.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use notely_core::defaults::REVISION_SYSTEM_PROMPT;
use notely_core::{
    FullHistory, HistoryAppend, HistoryEntry, HistoryUpdate, NoteId, NoteRepository,
    RevisionBody, RevisionReply,
};

use crate::{ApiError, AppState};

/// Append one entry to a note's history.
///
/// Accepts `{role, text, timestamp?}` or `{response}`; the latter is
/// recorded as an `ai` entry stamped now.
///
/// # Returns
/// - 200 OK with the full history after the append
/// - 400 Bad Request when role or text is missing
/// - 404 Not Found for an unknown id
pub async fn update_ai_history(
    State(state): State<AppState>,
    Path(id): Path<NoteId>,
    body: Result<Json<HistoryAppend>, JsonRejection>,
) -> Result<Json<HistoryUpdate>, ApiError> {
    let Json(append) = body?;
    let entry = append.into_entry(Utc::now())?;
    let role = entry.role;
    let ai_history = state.db.notes.append_entry(id, entry).await?;
    debug!(
        subsystem = "api",
        component = "history",
        op = "update_ai_history",
        note_id = id,
        role = %role,
        history_len = ai_history.len(),
        "History entry appended"
    );
    Ok(Json(HistoryUpdate {
        message: "AI history updated".to_string(),
        ai_history,
    }))
}

/// Generate a revision of the user's request and record it as an `ai` turn.
///
/// # Returns
/// - 200 OK with `{message, ai_response}`
/// - 400 Bad Request for blank text
/// - 404 Not Found for an unknown id
/// - 502 Bad Gateway when the generation backend fails
pub async fn generate_revision(
    State(state): State<AppState>,
    Path(id): Path<NoteId>,
    body: Result<Json<RevisionBody>, JsonRejection>,
) -> Result<Json<RevisionReply>, ApiError> {
    let Json(body) = body?;
    let text = body.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Revision text is required".to_string()));
    }
    state.db.notes.fetch(id).await?;

    let start = Instant::now();
    let ai_response = state
        .generator
        .generate_with_system(REVISION_SYSTEM_PROMPT, text)
        .await
        .map_err(|e| {
            warn!(
                subsystem = "api",
                component = "history",
                op = "generate_revision",
                note_id = id,
                model = state.generator.model_name(),
                error = %e,
                "Revision generation failed"
            );
            e
        })?;

    let timestamp = body.timestamp.unwrap_or_else(Utc::now);
    state
        .db
        .notes
        .append_entry(id, HistoryEntry::ai(ai_response.clone(), timestamp))
        .await?;

    info!(
        subsystem = "api",
        component = "history",
        op = "generate_revision",
        note_id = id,
        model = state.generator.model_name(),
        prompt_len = text.len(),
        response_len = ai_response.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Revision generated"
    );
    Ok(Json(RevisionReply {
        message: "Revision generated".to_string(),
        ai_response,
    }))
}

/// The stored history of a note.
pub async fn get_full_history(
    State(state): State<AppState>,
    Path(id): Path<NoteId>,
) -> Result<Json<FullHistory>, ApiError> {
    let history = state.db.notes.history(id).await?;
    Ok(Json(FullHistory { history }))
}
