//! Data model shared by the API client and the Note Store.
//!
//! Wire names follow the store's JSON contract (`type`, `promptTarget`,
//! `ai_history`); Rust field names follow Rust conventions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::defaults::{CREDENTIAL_KEY_PREFIX, NO_CONTENT, UNTITLED};
use crate::error::Error;

/// Store-assigned note identifier.
pub type NoteId = i64;

// =============================================================================
// NOTE TYPE
// =============================================================================

/// Note variant. Only prompt notes can be sent to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteType {
    #[default]
    Normal,
    Prompt,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "normal" => Ok(Self::Normal),
            "prompt" => Ok(Self::Prompt),
            other => Err(Error::Validation(format!("Unknown note type: {}", other))),
        }
    }
}

impl Serialize for NoteType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NoteType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => raw.parse().map_err(serde::de::Error::custom),
            None => Ok(Self::Normal),
        }
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

/// AI provider identifier used as a note's prompt target.
///
/// Identifiers outside the known set are kept verbatim in [`Provider::Other`]
/// so that dispatching such a note reports an unknown provider instead of
/// failing to read the note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    Gpt4o,
    Claude,
    Gemini,
    Perplexity,
    StableDiffusion,
    Sora,
    Other(String),
}

impl Provider {
    /// The fixed provider set offered by the editor.
    pub fn known() -> [Provider; 6] {
        [
            Provider::Gpt4o,
            Provider::StableDiffusion,
            Provider::Sora,
            Provider::Perplexity,
            Provider::Gemini,
            Provider::Claude,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Perplexity => "perplexity",
            Self::StableDiffusion => "stable-diffusion",
            Self::Sora => "sora",
            Self::Other(id) => id,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Name under which the provider's credential is persisted.
    pub fn credential_key(&self) -> String {
        format!("{}{}", CREDENTIAL_KEY_PREFIX, self.as_str())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Provider {
    fn from(s: &str) -> Self {
        match s.trim() {
            "gpt-4o" => Self::Gpt4o,
            "claude" => Self::Claude,
            "gemini" => Self::Gemini,
            "perplexity" => Self::Perplexity,
            "stable-diffusion" => Self::StableDiffusion,
            "sora" => Self::Sora,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Provider::from(s))
    }
}

impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Provider::from(raw.as_str()))
    }
}

/// `promptTarget` is `""` on the wire when unset.
mod prompt_target_field {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Provider>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_ref().map(Provider::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Provider>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Provider::from(trimmed))
            }
        }))
    }
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 and zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC).
/// Returns `None` for blank or unparseable input.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way the store records it (millisecond RFC 3339, `Z`).
pub fn render_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub mod timestamp_field {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&render_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}

/// History read from any JSON. Anything but an array is an empty history.
pub fn history_from_value(value: JsonValue) -> Vec<HistoryEntry> {
    match value {
        JsonValue::Array(items) => items.into_iter().map(HistoryEntry::from).collect(),
        _ => Vec::new(),
    }
}

/// Deserializer for `ai_history`-shaped fields; see [`history_from_value`].
pub fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(history_from_value)
}

/// Missing and `null` sequences both read as empty.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// HISTORY
// =============================================================================

/// Author of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Ai,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "ai" | "assistant" => Ok(Self::Ai),
            other => Err(Error::Validation(format!("Unknown role: {:?}", other))),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One turn in a note's conversation thread.
///
/// Reading is lenient per element so one odd entry never hides a note: an
/// unknown or missing role reads as [`Role::User`], a missing or `null` text
/// as empty, and a bare string as a user turn with that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "JsonValue")]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
    #[serde(serialize_with = "timestamp_field::serialize")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<JsonValue> for HistoryEntry {
    fn from(value: JsonValue) -> Self {
        let mut fields = match value {
            JsonValue::Object(fields) => fields,
            JsonValue::Null => serde_json::Map::new(),
            JsonValue::String(text) => return Self::untimed(Role::User, text),
            other => return Self::untimed(Role::User, other.to_string()),
        };
        let role = fields
            .get("role")
            .and_then(JsonValue::as_str)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Role::User);
        let text = match fields.remove("text") {
            None | Some(JsonValue::Null) => String::new(),
            Some(JsonValue::String(text)) => text,
            Some(other) => other.to_string(),
        };
        let timestamp = fields
            .get("timestamp")
            .and_then(JsonValue::as_str)
            .and_then(parse_timestamp);
        Self {
            role,
            text,
            timestamp,
        }
    }
}

impl HistoryEntry {
    pub fn new(role: Role, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Some(timestamp),
        }
    }

    fn untimed(role: Role, text: String) -> Self {
        Self {
            role,
            text,
            timestamp: None,
        }
    }

    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::User, text, timestamp)
    }

    pub fn ai(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::Ai, text, timestamp)
    }
}

// =============================================================================
// NOTE
// =============================================================================

/// A note as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub kind: NoteType,
    #[serde(rename = "promptTarget", default, with = "prompt_target_field")]
    pub prompt_target: Option<Provider>,
    #[serde(default, deserialize_with = "lenient_history")]
    pub ai_history: Vec<HistoryEntry>,
}

impl Note {
    pub fn is_prompt(&self) -> bool {
        self.kind == NoteType::Prompt
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    pub fn display_content(&self) -> &str {
        if self.content.trim().is_empty() {
            NO_CONTENT
        } else {
            &self.content
        }
    }

    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.ai_history.last()
    }

    /// The editable fields of this note.
    pub fn to_input(&self) -> NoteInput {
        NoteInput {
            title: self.title.clone(),
            content: self.content.clone(),
            tag: self.tag.clone(),
            kind: self.kind,
            prompt_target: self.prompt_target.clone(),
        }
    }
}

/// Body of `POST /add_note` and `PUT /update_note/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub kind: NoteType,
    #[serde(rename = "promptTarget", default, with = "prompt_target_field")]
    pub prompt_target: Option<Provider>,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_kind(mut self, kind: NoteType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_prompt_target(mut self, target: Option<Provider>) -> Self {
        self.prompt_target = target;
        self
    }

    /// Apply store defaults: blank tag becomes the default tag, and a normal
    /// note carries no prompt target.
    pub fn normalized(mut self) -> Self {
        self.tag = crate::validation::normalize_tag(&self.tag);
        if self.kind == NoteType::Normal {
            self.prompt_target = None;
        }
        self
    }
}

/// A note-shaped record accepted by `POST /import_json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub kind: NoteType,
    #[serde(rename = "promptTarget", default, with = "prompt_target_field")]
    pub prompt_target: Option<Provider>,
    #[serde(default, deserialize_with = "lenient_history")]
    pub ai_history: Vec<HistoryEntry>,
}

impl ImportRecord {
    pub fn into_parts(self) -> (NoteInput, Vec<HistoryEntry>) {
        let input = NoteInput {
            title: self.title,
            content: self.content,
            tag: self.tag,
            kind: self.kind,
            prompt_target: self.prompt_target,
        };
        (input.normalized(), self.ai_history)
    }
}

impl From<Note> for ImportRecord {
    fn from(note: Note) -> Self {
        Self {
            title: note.title,
            content: note.content,
            tag: note.tag,
            kind: note.kind,
            prompt_target: note.prompt_target,
            ai_history: note.ai_history,
        }
    }
}

// =============================================================================
// HISTORY APPEND / REVISION BODIES
// =============================================================================

/// Body of `PUT /update_ai_history/{id}`.
///
/// The store accepts a structured entry or a bare AI response. Untagged
/// matching tries `Response` first so a body with a `response` field is
/// always read as an AI reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryAppend {
    Response {
        response: String,
    },
    Structured {
        #[serde(default)]
        role: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        timestamp: Option<String>,
    },
}

impl HistoryAppend {
    pub fn structured(entry: &HistoryEntry) -> Self {
        Self::Structured {
            role: Some(entry.role.to_string()),
            text: Some(entry.text.clone()),
            timestamp: entry.timestamp.as_ref().map(render_timestamp),
        }
    }

    pub fn response(text: impl Into<String>) -> Self {
        Self::Response {
            response: text.into(),
        }
    }

    /// Resolve into the entry to append. `now` stamps entries that carry no
    /// usable timestamp.
    pub fn into_entry(self, now: DateTime<Utc>) -> crate::Result<HistoryEntry> {
        match self {
            Self::Response { response } => {
                if response.trim().is_empty() {
                    return Err(Error::Validation("response is required".to_string()));
                }
                Ok(HistoryEntry::ai(response, now))
            }
            Self::Structured {
                role,
                text,
                timestamp,
            } => {
                let role = role
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| Error::Validation("role and text are required".to_string()))?
                    .parse::<Role>()?;
                let text = text
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| Error::Validation("role and text are required".to_string()))?;
                let timestamp = timestamp.as_deref().and_then(parse_timestamp).unwrap_or(now);
                Ok(HistoryEntry::new(role, text, timestamp))
            }
        }
    }
}

/// Body of `POST /generate_revision/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionBody {
    #[serde(default)]
    pub text: String,
    #[serde(default, with = "timestamp_field")]
    pub timestamp: Option<DateTime<Utc>>,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Acknowledgement from a mutation without a resource body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,
}

/// Response of `PUT /update_ai_history/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryUpdate {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_history")]
    pub ai_history: Vec<HistoryEntry>,
}

/// Response of `POST /generate_revision/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RevisionReply {
    #[serde(default)]
    pub message: String,
    pub ai_response: String,
}

/// Response of `GET /get_full_history/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FullHistory {
    #[serde(default, deserialize_with = "lenient_history")]
    pub history: Vec<HistoryEntry>,
}

/// Response of `POST /import_json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: Vec<Note>,
}

/// JSON error body returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_note_without_history_field_gets_empty_history() {
        let note: Note = serde_json::from_value(json!({
            "id": 1, "title": "A", "content": "B", "tag": "", "type": "normal", "promptTarget": ""
        }))
        .unwrap();
        assert!(note.ai_history.is_empty());
        assert_eq!(note.prompt_target, None);
    }

    #[test]
    fn test_note_with_null_history_gets_empty_history() {
        let note: Note = serde_json::from_value(json!({
            "id": 2, "title": "A", "content": "B", "ai_history": null
        }))
        .unwrap();
        assert!(note.ai_history.is_empty());
        assert_eq!(note.kind, NoteType::Normal);
    }

    #[test]
    fn test_note_preserves_history_order() {
        let note: Note = serde_json::from_value(json!({
            "id": 3, "title": "A", "content": "B", "type": "prompt", "promptTarget": "claude",
            "ai_history": [
                {"role": "user", "text": "first", "timestamp": "2025-02-04T10:00:00"},
                {"role": " AI ", "text": "second", "timestamp": "2025-02-04T10:01:00.000Z"},
                {"role": "user", "text": "third"}
            ]
        }))
        .unwrap();
        let texts: Vec<&str> = note.ai_history.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(note.ai_history[1].role, Role::Ai);
        assert_eq!(note.ai_history[2].timestamp, None);
        assert_eq!(note.prompt_target, Some(Provider::Claude));
        assert!(note.is_prompt());
    }

    #[test]
    fn test_note_serializes_wire_names() {
        let note = Note {
            id: 9,
            title: "t".into(),
            content: "c".into(),
            tag: "work".into(),
            kind: NoteType::Prompt,
            prompt_target: Some(Provider::Gpt4o),
            ai_history: vec![],
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["type"], "prompt");
        assert_eq!(value["promptTarget"], "gpt-4o");
        assert_eq!(value["ai_history"], json!([]));
    }

    #[test]
    fn test_unknown_prompt_target_is_kept() {
        let note: Note = serde_json::from_value(json!({
            "id": 4, "title": "A", "content": "B", "promptTarget": "llama-9000"
        }))
        .unwrap();
        assert_eq!(
            note.prompt_target,
            Some(Provider::Other("llama-9000".to_string()))
        );
        assert!(!note.prompt_target.unwrap().is_known());
    }

    #[test]
    fn test_unknown_note_type_is_rejected() {
        let result = serde_json::from_value::<NoteInput>(json!({"title": "a", "type": "memo"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_provider_credential_key() {
        assert_eq!(Provider::Gpt4o.credential_key(), "apiKey_gpt-4o");
        assert_eq!(Provider::from("stable-diffusion"), Provider::StableDiffusion);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 2, 4, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-02-04T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-02-04T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-02-04T19:00:00+09:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn test_render_timestamp_millis_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 2, 4, 10, 0, 0).unwrap();
        assert_eq!(render_timestamp(&ts), "2025-02-04T10:00:00.000Z");
    }

    #[test]
    fn test_normalized_input_defaults_tag_and_drops_target() {
        let input = NoteInput::new("t", "c")
            .with_tag("   ")
            .with_prompt_target(Some(Provider::Claude))
            .normalized();
        assert_eq!(input.tag, "unclassified");
        assert_eq!(input.prompt_target, None);

        let prompt = NoteInput::new("t", "c")
            .with_kind(NoteType::Prompt)
            .with_prompt_target(Some(Provider::Claude))
            .normalized();
        assert_eq!(prompt.prompt_target, Some(Provider::Claude));
    }

    #[test]
    fn test_history_append_response_shape() {
        let body: HistoryAppend = serde_json::from_value(json!({"response": "hi"})).unwrap();
        let now = Utc::now();
        let entry = body.into_entry(now).unwrap();
        assert_eq!(entry.role, Role::Ai);
        assert_eq!(entry.text, "hi");
        assert_eq!(entry.timestamp, Some(now));
    }

    #[test]
    fn test_history_append_structured_shape() {
        let body: HistoryAppend = serde_json::from_value(json!({
            "role": "user", "text": "fix grammar", "timestamp": "2025-02-04T10:00:00.000Z"
        }))
        .unwrap();
        let entry = body.into_entry(Utc::now()).unwrap();
        assert_eq!(entry.role, Role::User);
        assert_eq!(
            entry.timestamp,
            Some(Utc.with_ymd_and_hms(2025, 2, 4, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_history_append_requires_role_and_text() {
        let body: HistoryAppend = serde_json::from_value(json!({"text": "orphan"})).unwrap();
        assert!(matches!(
            body.into_entry(Utc::now()),
            Err(Error::Validation(_))
        ));

        let body: HistoryAppend = serde_json::from_value(json!({"role": "user"})).unwrap();
        assert!(body.into_entry(Utc::now()).is_err());
    }

    #[test]
    fn test_history_entry_reads_irregular_shapes() {
        let history: Vec<HistoryEntry> = serde_json::from_value(json!([
            "user: hi",
            {"role": "system", "text": "be nice", "timestamp": "2025-02-04T10:00:00Z"},
            {"text": "no role"},
            {"role": "AI", "text": null},
            null,
            7
        ]))
        .unwrap();
        let shapes: Vec<(Role, &str)> = history.iter().map(|e| (e.role, e.text.as_str())).collect();
        assert_eq!(
            shapes,
            vec![
                (Role::User, "user: hi"),
                (Role::User, "be nice"),
                (Role::User, "no role"),
                (Role::Ai, ""),
                (Role::User, ""),
                (Role::User, "7"),
            ]
        );
        assert!(history[1].timestamp.is_some());
        assert!(history[0].timestamp.is_none());
    }

    #[test]
    fn test_non_array_history_reads_empty() {
        let note: Note = serde_json::from_value(json!({
            "id": 9, "title": "A", "content": "B", "ai_history": "garbled"
        }))
        .unwrap();
        assert!(note.ai_history.is_empty());
    }

    #[test]
    fn test_history_entry_round_trips_wire_shape() {
        let ts = Utc.with_ymd_and_hms(2025, 2, 4, 10, 0, 0).unwrap();
        let entry = HistoryEntry::ai("done", ts);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"role": "ai", "text": "done", "timestamp": "2025-02-04T10:00:00.000Z"})
        );
        assert_eq!(serde_json::from_value::<HistoryEntry>(value).unwrap(), entry);
    }

    #[test]
    fn test_history_append_structured_serializes_flat() {
        let ts = Utc.with_ymd_and_hms(2025, 2, 4, 10, 0, 0).unwrap();
        let body = HistoryAppend::structured(&HistoryEntry::user("x", ts));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"role": "user", "text": "x", "timestamp": "2025-02-04T10:00:00.000Z"})
        );
        assert_eq!(
            serde_json::to_value(HistoryAppend::response("y")).unwrap(),
            json!({"response": "y"})
        );
    }

    #[test]
    fn test_import_record_into_parts_normalizes() {
        let record: ImportRecord =
            serde_json::from_value(json!({"title": "a", "content": "b"})).unwrap();
        let (input, history) = record.into_parts();
        assert_eq!(input.tag, "unclassified");
        assert!(history.is_empty());
    }
}
