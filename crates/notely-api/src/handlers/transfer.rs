//! Export and import handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value as JsonValue;
use tracing::info;

use notely_core::{validate_import_payload, ImportResponse, Note, NoteRepository};
use notely_db::notes_to_csv;

use crate::{ApiError, AppState};

/// All notes as a `notes.csv` attachment.
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let notes = state.db.notes.list().await?;
    let body = notes_to_csv(&notes);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"notes.csv\"",
            ),
        ],
        body,
    ))
}

/// All notes as JSON, in the same shape `import_json` accepts.
pub async fn export_json(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.db.notes.list().await?))
}

/// Import a JSON array of notes in one transaction. Ids in the payload are
/// ignored; every record gets a fresh id.
///
/// # Returns
/// - 201 Created with the imported notes
/// - 400 Bad Request when the payload is not an array of note objects
pub async fn import_json(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let Json(payload) = body?;
    let records = validate_import_payload(&payload)?;
    let notes = state.db.notes.insert_bulk(records).await?;
    info!(
        subsystem = "api",
        component = "transfer",
        op = "import_json",
        result_count = notes.len(),
        "Notes imported"
    );
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            message: format!("Imported {} notes", notes.len()),
            notes,
        }),
    ))
}
