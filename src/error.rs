//! Provider errors and host diagnostics

use serde::{Deserialize, Serialize};

/// Errors produced while reconciling a resource
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A required attribute is missing or a validator rejected its value
    #[error("{attribute}: {message}")]
    Malformed { attribute: String, message: String },

    /// A domain invariant was violated
    #[error("{0}")]
    InvalidArgument(String),

    /// The remote service rejected the call; the message is passed through unchanged
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The remote object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The host cancelled the operation or its deadline elapsed
    #[error("operation cancelled")]
    Cancelled,

    /// Provider configuration is absent or unusable
    #[error("provider configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    pub fn malformed(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub fn missing(attribute: impl Into<String>) -> Self {
        Self::malformed(attribute, "required attribute is missing")
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short category shown as the diagnostic summary
    fn summary(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "Invalid attribute value",
            Self::InvalidArgument(_) => "Invalid argument",
            Self::Remote { .. } => "Remote API call failed",
            Self::NotFound(_) => "Resource not found",
            Self::Cancelled => "Operation cancelled",
            Self::Config(_) => "Provider configuration error",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let attribute = match self {
            Self::Malformed { attribute, .. } => Some(attribute.clone()),
            _ => None,
        };
        Diagnostic {
            severity: Severity::Error,
            summary: self.summary().to_string(),
            detail: self.to_string(),
            attribute,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A message attached to the instance being reconciled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_diagnostic_names_attribute() {
        let diag = ProviderError::missing("name").to_diagnostic();
        assert_eq!(diag.attribute.as_deref(), Some("name"));
        assert!(diag.detail.contains("name"));
        assert!(diag.is_error());
    }

    #[test]
    fn test_remote_message_is_unchanged() {
        let err = ProviderError::Remote {
            status: 409,
            message: "deployment is locked".to_string(),
        };
        assert_eq!(err.to_string(), "deployment is locked");
    }
}
