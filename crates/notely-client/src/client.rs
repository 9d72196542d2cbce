//! HTTP client for the Note Store REST surface.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use notely_core::{
    validate_import_payload, validate_note_fields, Ack, Error, ErrorBody, FullHistory,
    HistoryAppend, HistoryEntry, HistoryUpdate, ImportResponse, Note, NoteId, NoteInput,
    NoteStore, Result, RevisionBody, RevisionReply,
};

use crate::config::ClientConfig;

/// Note Store client. Performs no retries and no caching.
#[derive(Debug, Clone)]
pub struct NoteStoreClient {
    client: Client,
    base_url: String,
}

impl NoteStoreClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Self::new(&config.store_url, config.store_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into an error carrying the store's message.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .ok()
            .filter(|m| !m.is_empty())
            .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        warn!(
            subsystem = "client",
            component = "note_store_client",
            status = status.as_u16(),
            error = %message,
            "Note Store request failed"
        );
        Err(Error::from_status(status.as_u16(), message))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn log_done(op: &str, start: Instant) {
        debug!(
            subsystem = "client",
            component = "note_store_client",
            op = op,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note Store request complete"
        );
    }

    /// Liveness probe against `GET /`.
    pub async fn health(&self) -> Result<bool> {
        let response = self.client.get(self.url("/")).send().await?;
        Ok(response.status().is_success())
    }

    /// Parse a JSON document and import it. Parse failures are validation
    /// errors and send nothing.
    pub async fn import_json_str(&self, raw: &str) -> Result<Vec<Note>> {
        let payload: JsonValue = serde_json::from_str(raw)
            .map_err(|e| Error::Validation(format!("Import file is not valid JSON: {}", e)))?;
        self.import_json(payload).await
    }
}

#[async_trait]
impl NoteStore for NoteStoreClient {
    async fn list_notes(&self) -> Result<Vec<Note>> {
        let start = Instant::now();
        let response = self.client.get(self.url("/get_notes")).send().await?;
        let notes: Vec<Note> = Self::decode(response).await?;
        Self::log_done("list_notes", start);
        Ok(notes)
    }

    async fn create_note(&self, input: NoteInput) -> Result<Note> {
        validate_note_fields(&input.title, &input.content)?;
        let start = Instant::now();
        let response = self
            .client
            .post(self.url("/add_note"))
            .json(&input.normalized())
            .send()
            .await?;
        let note: Note = Self::decode(response).await?;
        Self::log_done("create_note", start);
        Ok(note)
    }

    async fn update_note(&self, id: NoteId, input: NoteInput) -> Result<Note> {
        validate_note_fields(&input.title, &input.content)?;
        let start = Instant::now();
        let response = self
            .client
            .put(self.url(&format!("/update_note/{}", id)))
            .json(&input.normalized())
            .send()
            .await?;
        let note: Note = Self::decode(response).await?;
        Self::log_done("update_note", start);
        Ok(note)
    }

    async fn delete_note(&self, id: NoteId) -> Result<Ack> {
        let start = Instant::now();
        let response = self
            .client
            .delete(self.url(&format!("/delete_note/{}", id)))
            .send()
            .await?;
        let ack: Ack = Self::decode(response).await?;
        Self::log_done("delete_note", start);
        Ok(ack)
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.url("/search_notes"))
            .query(&[("q", query)])
            .send()
            .await?;
        let notes: Vec<Note> = Self::decode(response).await?;
        Self::log_done("search_notes", start);
        Ok(notes)
    }

    async fn append_structured_entry(
        &self,
        id: NoteId,
        entry: &HistoryEntry,
    ) -> Result<Vec<HistoryEntry>> {
        if entry.text.trim().is_empty() {
            return Err(Error::Validation("History entry text is required".to_string()));
        }
        let start = Instant::now();
        let response = self
            .client
            .put(self.url(&format!("/update_ai_history/{}", id)))
            .json(&HistoryAppend::structured(entry))
            .send()
            .await?;
        let update: HistoryUpdate = Self::decode(response).await?;
        Self::log_done("append_structured_entry", start);
        Ok(update.ai_history)
    }

    async fn append_ai_response(&self, id: NoteId, text: &str) -> Result<Vec<HistoryEntry>> {
        let start = Instant::now();
        let response = self
            .client
            .put(self.url(&format!("/update_ai_history/{}", id)))
            .json(&HistoryAppend::response(text))
            .send()
            .await?;
        let update: HistoryUpdate = Self::decode(response).await?;
        Self::log_done("append_ai_response", start);
        Ok(update.ai_history)
    }

    async fn generate_revision(
        &self,
        id: NoteId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<RevisionReply> {
        if text.trim().is_empty() {
            return Err(Error::Validation("Revision text is required".to_string()));
        }
        let start = Instant::now();
        let response = self
            .client
            .post(self.url(&format!("/generate_revision/{}", id)))
            .json(&RevisionBody {
                text: text.to_string(),
                timestamp: Some(timestamp),
            })
            .send()
            .await?;
        let reply: RevisionReply = Self::decode(response).await?;
        Self::log_done("generate_revision", start);
        Ok(reply)
    }

    async fn full_history(&self, id: NoteId) -> Result<Vec<HistoryEntry>> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.url(&format!("/get_full_history/{}", id)))
            .send()
            .await?;
        let history: FullHistory = Self::decode(response).await?;
        Self::log_done("full_history", start);
        Ok(history.history)
    }

    async fn export_csv(&self) -> Result<String> {
        let start = Instant::now();
        let response = self.client.get(self.url("/export_csv")).send().await?;
        let body = Self::check(response).await?.text().await?;
        Self::log_done("export_csv", start);
        Ok(body)
    }

    async fn export_json(&self) -> Result<Vec<Note>> {
        let start = Instant::now();
        let response = self.client.get(self.url("/export_json")).send().await?;
        let notes: Vec<Note> = Self::decode(response).await?;
        Self::log_done("export_json", start);
        Ok(notes)
    }

    async fn import_json(&self, payload: JsonValue) -> Result<Vec<Note>> {
        validate_import_payload(&payload)?;
        let start = Instant::now();
        let response = self
            .client
            .post(self.url("/import_json"))
            .json(&payload)
            .send()
            .await?;
        let imported: ImportResponse = Self::decode(response).await?;
        Self::log_done("import_json", start);
        Ok(imported.notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            NoteStoreClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/get_notes"), "http://localhost:5000/get_notes");
    }

    #[test]
    fn test_from_config_validates() {
        let config = ClientConfig {
            store_url: "ftp://nope".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            NoteStoreClient::from_config(&config),
            Err(Error::Config(_))
        ));
    }
}
