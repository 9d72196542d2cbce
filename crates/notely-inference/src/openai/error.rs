//! Mapping of chat completions rejections onto [`Error::Inference`].

use notely_core::Error;

/// Why the provider refused a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthorized,
    RateLimited,
    UnknownModel,
    ContextTooLong,
    Upstream,
    Other,
}

impl Rejection {
    /// Classify by status first, then by the body's `error.type`.
    pub fn classify(status: u16, kind: &str) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            429 => Self::RateLimited,
            404 => Self::UnknownModel,
            500..=599 => Self::Upstream,
            _ if kind == "model_not_found" => Self::UnknownModel,
            _ if kind.contains("context_length") => Self::ContextTooLong,
            _ => Self::Other,
        }
    }

    fn label(self) -> Option<&'static str> {
        match self {
            Self::Unauthorized => Some("Authentication failed"),
            Self::RateLimited => Some("Rate limit exceeded"),
            Self::UnknownModel => Some("Model not found"),
            Self::ContextTooLong => Some("Context too long"),
            Self::Upstream => Some("Server error"),
            Self::Other => None,
        }
    }

    /// All rejections are inference failures, which the store reports as 502.
    pub fn into_error(self, message: &str) -> Error {
        Error::Inference(match self.label() {
            Some(label) => format!("{}: {}", label, message),
            None => message.to_string(),
        })
    }
}
