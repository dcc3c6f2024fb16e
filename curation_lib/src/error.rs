//! Error types for the library layer.

use std::fmt;

use crate::validation::ValidationErrors;

/// Errors produced by controllers, form sessions and trackers.
///
/// Transport failures arrive as [`ConsoleError::Api`]; envelope rejections
/// (`code != 200`) as [`ConsoleError::Application`]. Validation errors never
/// reach the network.
#[derive(Debug)]
pub enum ConsoleError {
    /// Network failure, non-2xx status or undecodable body.
    Api(curation_api::Error),
    /// The backend rejected the request with a business-rule message.
    Application { code: i64, message: String },
    /// One or more draft fields failed their rules.
    Validation(ValidationErrors),
    /// A bulk operation was asked to act on an empty id set.
    NothingSelected,
    /// A form operation ran while no session was open.
    NoOpenSession,
    /// User-provided input failed validation outside a form.
    InvalidInput(String),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// Configuration could not be loaded.
    Config(String),
}

impl ConsoleError {
    /// The single line shown to a user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Application { message, code } if message.trim().is_empty() => {
                format!("Request rejected (code {})", code)
            }
            Self::Application { message, .. } => message.clone(),
            Self::Validation(errors) => errors.to_string(),
            Self::NothingSelected => "Nothing selected".to_string(),
            Self::NoOpenSession => "No form is open".to_string(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Serialization(e) => format!("Serialization error: {}", e),
            Self::Config(msg) => format!("Configuration error: {}", msg),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Application { code, message } => {
                write!(f, "Rejected by server (code {}): {}", code, message)
            }
            Self::Validation(errors) => write!(f, "Validation failed: {}", errors),
            Self::NothingSelected => write!(f, "Nothing selected"),
            Self::NoOpenSession => write!(f, "No form session is open"),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<curation_api::Error> for ConsoleError {
    fn from(e: curation_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<ValidationErrors> for ConsoleError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
