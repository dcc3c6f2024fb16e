//! Error types for the API client.

/// Errors that can occur when making API requests.
///
/// Every variant carries enough to render a single human-readable line via
/// [`Error::user_message`]; server-provided messages win over generic ones.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be built (bad URL, unserializable body, bad MIME type).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("Request failed: {fallback}")]
    RequestFailed { fallback: String },
    /// The API returned a non-success HTTP status.
    ///
    /// `message` holds the envelope `message` when the error body was shaped
    /// like an envelope.
    #[error("Request failed with status {status}")]
    HttpStatus {
        status: u16,
        message: Option<String>,
        body: String,
    },
    /// The response body did not match the expected schema.
    #[error("Failed to decode response: {reason}")]
    Decode { reason: String, body: String },
}

impl Error {
    /// The message to show a user, preferring the nested server message.
    pub fn user_message(&self) -> String {
        match self {
            Error::HttpStatus {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Error::HttpStatus { status, .. } => format!("Request failed with status {}", status),
            Error::RequestFailed { fallback } => fallback.clone(),
            Error::InvalidRequest(reason) => format!("Invalid request: {}", reason),
            Error::Decode { .. } => "Unexpected response from server".to_string(),
        }
    }

    /// The HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
