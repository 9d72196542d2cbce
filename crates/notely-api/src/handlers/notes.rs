//! Note CRUD and search handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use notely_core::{Ack, Note, NoteId, NoteInput, NoteRepository};

use crate::{ApiError, AppState};

/// Query parameters for `GET /search_notes`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// List every note in id order.
pub async fn get_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.db.notes.list().await?))
}

/// Create a note.
///
/// # Returns
/// - 201 Created with the stored note
/// - 400 Bad Request when title or content is blank
pub async fn add_note(
    State(state): State<AppState>,
    body: Result<Json<NoteInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(input) = body?;
    let note = state.db.notes.insert(input).await?;
    info!(
        subsystem = "api",
        component = "notes",
        op = "add_note",
        note_id = note.id,
        "Note created"
    );
    Ok((StatusCode::CREATED, Json(note)))
}

/// Replace a note's editable fields. History is untouched.
///
/// # Returns
/// - 200 OK with the updated note
/// - 400 Bad Request when title or content is blank
/// - 404 Not Found for an unknown id
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<NoteId>,
    body: Result<Json<NoteInput>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(input) = body?;
    let note = state.db.notes.update(id, input).await?;
    info!(
        subsystem = "api",
        component = "notes",
        op = "update_note",
        note_id = id,
        "Note updated"
    );
    Ok(Json(note))
}

/// Delete a note together with its history.
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<NoteId>,
) -> Result<Json<Ack>, ApiError> {
    state.db.notes.delete(id).await?;
    info!(
        subsystem = "api",
        component = "notes",
        op = "delete_note",
        note_id = id,
        "Note deleted"
    );
    Ok(Json(Ack {
        message: "Note deleted".to_string(),
        id: Some(id),
    }))
}

/// Case-insensitive substring search over title, content and tag.
pub async fn search_notes(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.db.notes.search(&query.q).await?))
}
