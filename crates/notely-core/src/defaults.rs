//! Centralized default constants for notely.
//!
//! All crates reference these constants instead of defining their own magic
//! values. Organized by domain area.

// =============================================================================
// NOTES
// =============================================================================

/// Tag assigned to a note whose tag is blank.
pub const DEFAULT_TAG: &str = "unclassified";

/// Label shown for a note without a title.
pub const UNTITLED: &str = "(untitled)";

/// Label shown for a note without content.
pub const NO_CONTENT: &str = "(no content)";

// =============================================================================
// HISTORY VIEW
// =============================================================================

/// Number of history entries shown on a note card before "show more".
pub const HISTORY_PREVIEW_LIMIT: usize = 3;

/// Display format for history timestamps (`YYYY-MM-DD HH:MM`).
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

// =============================================================================
// CLIENT
// =============================================================================

/// Default Note Store base URL.
pub const NOTE_STORE_URL: &str = "http://127.0.0.1:5000";

/// Default Note Store request timeout in seconds.
pub const STORE_TIMEOUT_SECS: u64 = 30;

/// Default provider request timeout in seconds.
pub const PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Prefix of the provider-keyed credential names in the settings store.
pub const CREDENTIAL_KEY_PREFIX: &str = "apiKey_";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "notely";

/// File name of the credential store.
pub const CREDENTIALS_FILE: &str = "credentials.toml";

/// File name of the client configuration.
pub const CLIENT_CONFIG_FILE: &str = "client.toml";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port for the Note Store.
pub const SERVER_PORT: u16 = 5000;

/// Default database URL for the Note Store.
pub const DATABASE_URL: &str = "sqlite://notes.db?mode=rwc";

/// Default origin allowed by CORS (the web UI dev server).
pub const CORS_ORIGIN: &str = "http://localhost:3000";

/// Maximum accepted request body for imports, in bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// REVISION
// =============================================================================

/// Model used by the store to generate revisions.
pub const REVISION_MODEL: &str = "gpt-4o";

/// System instruction for revision generation.
pub const REVISION_SYSTEM_PROMPT: &str = "You are an expert AI prompt designer. \
Improve the user's prompt so it is clearer and more effective, following the \
instructions they give.";
