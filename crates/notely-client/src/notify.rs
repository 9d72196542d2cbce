//! Transient user notifications raised at action boundaries.

use std::fmt;

use notely_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A short message for the user about the outcome of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl From<&Error> for Notification {
    fn from(err: &Error) -> Self {
        let message = match err {
            Error::Validation(msg) => msg.clone(),
            Error::NotFound(msg) => format!("Not found: {}", msg),
            Error::MissingCredential(provider) => format!(
                "No API key configured for {}. Run `notely config set-key {} <key>`.",
                provider, provider
            ),
            Error::UnknownProvider(provider) => {
                format!("{} has no configured endpoint", provider)
            }
            Error::Network(msg) => format!("Could not reach the server: {}", msg),
            Error::SentNotRecorded {
                provider, reply, ..
            } => format!(
                "{} replied but the reply could not be saved to history. Reply:\n{}",
                provider, reply
            ),
            other => other.to_string(),
        };
        Notification::error(message)
    }
}

impl From<Error> for Notification {
    fn from(err: Error) -> Self {
        Notification::from(&err)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "i",
            NotificationLevel::Error => "✗",
        };
        write!(f, "{} {}", marker, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notifications() {
        let n = Notification::from(Error::MissingCredential("claude".into()));
        assert!(n.is_error());
        assert!(n.message.contains("notely config set-key claude"));

        let n = Notification::from(Error::SentNotRecorded {
            provider: "gpt-4o".into(),
            reply: "the reply".into(),
            source: Box::new(Error::Network("down".into())),
        });
        assert!(n.message.contains("the reply"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Notification::success("Saved").to_string(), "✓ Saved");
        assert_eq!(
            Notification::from(Error::Validation("Title is required".into())).to_string(),
            "✗ Title is required"
        );
    }
}
