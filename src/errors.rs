use serde::{Deserialize, Serialize};

/// Message shown to the user whenever a backend call fails.
pub const REQUEST_FAILED_MESSAGE: &str =
    "Something went wrong while talking to the server. Please try again.";

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// HTTP 4xx.
    ClientError,
    /// HTTP 5xx.
    ServerError,
    /// Rejected before any request was sent.
    Validation,
    /// Local failure (configuration, token file, disk).
    Local,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid form: {0}")]
    InvalidForm(validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) | ClientError::Decode(_) => ErrorKind::Transport,
            ClientError::Api { status, .. } if *status >= 500 => ErrorKind::ServerError,
            ClientError::Api { .. } => ErrorKind::ClientError,
            ClientError::Validation(_) | ClientError::InvalidForm(_) => ErrorKind::Validation,
            ClientError::Config(_) | ClientError::Session(_) | ClientError::Io(_) => {
                ErrorKind::Local
            }
        }
    }

    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The text surfaced to the user in a notification.
    ///
    /// Request failures are not inspected beyond their existence, so every
    /// transport and HTTP error maps to the same fixed message. Form
    /// validation failures never reach the network and keep their own text.
    pub fn notification_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::InvalidForm(errors) => form_error_summary(errors),
            _ => REQUEST_FAILED_MESSAGE.to_string(),
        }
    }
}

fn form_error_summary(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    if messages.is_empty() {
        "The form contains invalid values".to_string()
    } else {
        messages.join("; ")
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::InvalidForm(err)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid URL: {}", err))
    }
}

/// Error body returned by the backend. `message` is either a string or a
/// list of strings (one per failed field).
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<ErrorMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorBody {
    /// Extracts the human readable message from a raw error body, falling
    /// back to the body text itself.
    pub(crate) fn message_from(raw: &str) -> String {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(ErrorBody {
                message: Some(ErrorMessage::One(message)),
                ..
            }) => message,
            Ok(ErrorBody {
                message: Some(ErrorMessage::Many(messages)),
                ..
            }) => messages.join("; "),
            Ok(ErrorBody {
                error: Some(error), ..
            }) => error,
            _ if raw.trim().is_empty() => "<empty body>".to_string(),
            _ => raw.trim().to_string(),
        }
    }
}
