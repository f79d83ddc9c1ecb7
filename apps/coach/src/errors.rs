use thiserror::Error;

/// Coarse classification of a failed action, used by the renderer and the CLI
/// exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Http,
    Auth,
}

/// Client-level error type.
///
/// `Display` is exactly the text shown to the user; messages are localized when
/// the error is constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoachError {
    /// Rejected before any network call: bad file, missing field, busy controller.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response, transport failure (`status: None`) or undecodable body.
    #[error("{message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    /// Identity provider failure. The message already carries the login prefix.
    #[error("{0}")]
    Auth(String),
}

impl CoachError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoachError::Validation(_) => ErrorKind::Validation,
            CoachError::Http { .. } => ErrorKind::Http,
            CoachError::Auth(_) => ErrorKind::Auth,
        }
    }

    pub fn http(status: Option<u16>, message: impl Into<String>) -> Self {
        CoachError::Http {
            status,
            message: message.into(),
        }
    }

    /// HTTP status attached to the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CoachError::Http { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CoachError {
    fn from(e: reqwest::Error) -> Self {
        tracing::warn!("HTTP transport error: {e}");
        CoachError::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
