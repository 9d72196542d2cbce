//! Shared tracing vocabulary.
//!
//! Events carry `subsystem` and `component` plus, where they apply, the
//! entity and measurement fields below. Levels:
//!
//! - `error`: the user sees a notification
//! - `warn`: recovered (stale refresh dropped, lenient history parse)
//! - `info`: startup, shutdown, completed mutations
//! - `debug`: request and response summaries
//! - `trace`: per-entry loops

/// `RUST_LOG` fallback for the Note Store service.
pub const DEFAULT_SERVICE_FILTER: &str = "notely_api=debug,notely_db=info,tower_http=debug";

/// `RUST_LOG` fallback for the command-line client.
pub const DEFAULT_CLI_FILTER: &str = "warn";

pub const SUBSYSTEM: &str = "subsystem";
pub const COMPONENT: &str = "component";
pub const OPERATION: &str = "op";
/// UUIDv7 set by the store on every request.
pub const REQUEST_ID: &str = "request_id";

pub const NOTE_ID: &str = "note_id";
pub const PROVIDER: &str = "provider";
pub const MODEL: &str = "model";
pub const ROLE: &str = "role";
pub const QUERY: &str = "query";

pub const DURATION_MS: &str = "duration_ms";
pub const RESULT_COUNT: &str = "result_count";
pub const HISTORY_LEN: &str = "history_len";
pub const PROMPT_LEN: &str = "prompt_len";
pub const RESPONSE_LEN: &str = "response_len";
/// Sequence number of a list refresh; older numbers are dropped.
pub const FETCH_SEQ: &str = "fetch_seq";

pub const STATUS: &str = "status";
pub const ERROR_MSG: &str = "error";
