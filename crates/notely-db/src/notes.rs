//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, Transaction};
use tracing::{debug, info, warn};

use notely_core::{
    history_from_value, validate_note_fields, Error, HistoryEntry, ImportRecord, Note, NoteId,
    NoteInput, NoteRepository, NoteType, Provider, Result,
};

use crate::escape_like;

const NOTE_COLUMNS: &str = "id, title, content, tag, type, prompt_target, ai_history";

/// SQLite implementation of NoteRepository.
#[derive(Clone)]
pub struct SqliteNoteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteNoteRepository {
    /// Create a new SqliteNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn not_found(id: NoteId) -> Error {
        Error::NotFound(format!("Note {} not found", id))
    }

    /// Insert within an existing transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        input: NoteInput,
        history: Vec<HistoryEntry>,
    ) -> Result<Note> {
        validate_note_fields(&input.title, &input.content)?;
        let input = input.normalized();
        let history_json = serde_json::to_string(&history)?;

        let result = sqlx::query(
            "INSERT INTO notes (title, content, tag, type, prompt_target, ai_history)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.tag)
        .bind(input.kind.as_str())
        .bind(input.prompt_target.as_ref().map(Provider::as_str).unwrap_or(""))
        .bind(history_json)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        self.fetch_tx(tx, result.last_insert_rowid()).await
    }

    /// Fetch within an existing transaction.
    pub async fn fetch_tx(&self, tx: &mut Transaction<'_, Sqlite>, id: NoteId) -> Result<Note> {
        let row = sqlx::query(&format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Self::not_found(id))?;
        note_from_row(&row)
    }

    async fn history_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: NoteId,
    ) -> Result<Vec<HistoryEntry>> {
        let raw: String = sqlx::query_scalar("SELECT ai_history FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Self::not_found(id))?;
        Ok(decode_history(id, &raw))
    }

    /// Append within an existing transaction.
    pub async fn append_entry_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: NoteId,
        entry: HistoryEntry,
    ) -> Result<Vec<HistoryEntry>> {
        let mut history = self.history_tx(tx, id).await?;
        history.push(clamp_timestamp(&history, entry));

        sqlx::query("UPDATE notes SET ai_history = ? WHERE id = ?")
            .bind(serde_json::to_string(&history)?)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        Ok(history)
    }
}

#[async_trait]
impl NoteRepository for SqliteNoteRepository {
    async fn insert(&self, input: NoteInput) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.insert_tx(&mut tx, input, Vec::new()).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = note.id,
            "Note inserted"
        );
        Ok(note)
    }

    async fn insert_bulk(&self, records: Vec<ImportRecord>) -> Result<Vec<Note>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut notes = Vec::with_capacity(records.len());
        for record in records {
            let (input, history) = record.into_parts();
            notes.push(self.insert_tx(&mut tx, input, history).await?);
        }
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "insert_bulk",
            result_count = notes.len(),
            "Notes imported"
        );
        Ok(notes)
    }

    async fn fetch(&self, id: NoteId) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!("SELECT {} FROM notes ORDER BY id", NOTE_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        let notes = rows.iter().map(note_from_row).collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            result_count = notes.len(),
            "Listed notes"
        );
        Ok(notes)
    }

    async fn search(&self, query: &str) -> Result<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(&query.trim().to_lowercase()));
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notes
             WHERE LOWER(title) LIKE ? ESCAPE '\\'
                OR LOWER(content) LIKE ? ESCAPE '\\'
                OR LOWER(tag) LIKE ? ESCAPE '\\'
             ORDER BY id",
            NOTE_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        let notes = rows.iter().map(note_from_row).collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "search",
            query = %query,
            result_count = notes.len(),
            "Searched notes"
        );
        Ok(notes)
    }

    async fn update(&self, id: NoteId, input: NoteInput) -> Result<Note> {
        validate_note_fields(&input.title, &input.content)?;
        let input = input.normalized();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = sqlx::query(
            "UPDATE notes SET title = ?, content = ?, tag = ?, type = ?, prompt_target = ?
             WHERE id = ?",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.tag)
        .bind(input.kind.as_str())
        .bind(input.prompt_target.as_ref().map(Provider::as_str).unwrap_or(""))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        let note = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "update",
            note_id = id,
            "Note updated"
        );
        Ok(note)
    }

    async fn delete(&self, id: NoteId) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }

        info!(
            subsystem = "db",
            component = "notes",
            op = "delete",
            note_id = id,
            "Note deleted"
        );
        Ok(())
    }

    async fn append_entry(&self, id: NoteId, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        let role = entry.role;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let history = self.append_entry_tx(&mut tx, id, entry).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "append_entry",
            note_id = id,
            role = %role,
            history_len = history.len(),
            "History entry appended"
        );
        Ok(history)
    }

    async fn history(&self, id: NoteId) -> Result<Vec<HistoryEntry>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let history = self.history_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(history)
    }
}

fn note_from_row(row: &SqliteRow) -> Result<Note> {
    let id: NoteId = row.try_get("id").map_err(Error::Database)?;
    let kind: String = row.try_get("type").map_err(Error::Database)?;
    let prompt_target: String = row.try_get("prompt_target").map_err(Error::Database)?;
    let history: String = row.try_get("ai_history").map_err(Error::Database)?;

    Ok(Note {
        id,
        title: row.try_get("title").map_err(Error::Database)?,
        content: row.try_get("content").map_err(Error::Database)?,
        tag: row.try_get("tag").map_err(Error::Database)?,
        kind: kind.parse().unwrap_or_else(|_| {
            warn!(
                subsystem = "db",
                component = "notes",
                note_id = id,
                kind = %kind,
                "Unknown stored note type, reading as normal"
            );
            NoteType::Normal
        }),
        prompt_target: match prompt_target.trim() {
            "" => None,
            target => Some(Provider::from(target)),
        },
        ai_history: decode_history(id, &history),
    })
}

/// Stored history, read per entry. Empty text, `null` and unparseable JSON
/// all decode to an empty history.
fn decode_history(id: NoteId, raw: &str) -> Vec<HistoryEntry> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(raw) {
        Ok(value) => history_from_value(value),
        Err(e) => {
            warn!(
                subsystem = "db",
                component = "notes",
                note_id = id,
                error = %e,
                "Stored history is not valid JSON, reading as empty"
            );
            Vec::new()
        }
    }
}

/// Never let an appended entry sort before the last recorded one.
fn clamp_timestamp(history: &[HistoryEntry], mut entry: HistoryEntry) -> HistoryEntry {
    let last = history.iter().filter_map(|e| e.timestamp).max();
    let ts = entry.timestamp.unwrap_or_else(Utc::now);
    entry.timestamp = Some(match last {
        Some(last) if ts < last => last,
        _ => ts,
    });
    entry
}
