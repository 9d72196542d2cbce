//! The error taxonomy shared by the client, the store and the backends.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Empty required field, malformed import payload, or otherwise bad input.
    /// Raised before any request is issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-2xx response from the Note Store or a provider.
    #[error("Request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// Unknown note id, or a 404 from the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Raised before dispatch; nothing is sent.
    #[error("No API key configured for provider: {0}")]
    MissingCredential(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// No response received (connect failure, timeout, broken body)
    #[error("Network error: {0}")]
    Network(String),

    /// The provider replied but the reply could not be appended to the note's
    /// history. The reply is kept so the caller can show or re-record it.
    #[error("Reply from {provider} was not recorded in history: {source}")]
    SentNotRecorded {
        provider: String,
        reply: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store's revision model failed. Reported as 502.
    #[error("Inference error: {0}")]
    Inference(String),

    /// A body or file that is not the expected JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map a non-success HTTP status and body message to an error.
    ///
    /// 404 becomes [`Error::NotFound`]; every other status is a
    /// [`Error::Request`] carrying the status code.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Error::NotFound(message),
            _ => Error::Request { status, message },
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => Some(*status),
            Error::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Error::from_status(status.as_u16(), e.to_string());
        }
        if e.is_decode() {
            return Error::Serialization(e.to_string());
        }
        Error::Network(e.to_string())
    }
}
