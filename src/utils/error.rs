//! Centralized error types and conversions for symptom-expert
//!
//! Library code returns `DiagnosisError` (built with `thiserror`).
//! CLI/main modules use `anyhow` for easy context.

use std::path::PathBuf;
use thiserror::Error;

/// Global error type for diagnosis operations
#[derive(Error, Debug)]
pub enum DiagnosisError {
    /// Message missing or too short; rejected before any state mutation
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Follow-up turn sent without a session id
    #[error("Session ID is required")]
    SessionRequired,

    /// Follow-up turn for an unknown or expired session
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Failure reading symptoms or rules from the knowledge collaborator
    #[error("Knowledge source error ({source_name}): {message}")]
    Knowledge {
        source_name: String,
        message: String,
    },

    /// A line of batch rule text could not be parsed
    #[error("Rule parse error on line {line}: {message}")]
    RuleParse { line: usize, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors with path context
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl DiagnosisError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    pub fn knowledge(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Knowledge {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn rule_parse(line: usize, message: impl Into<String>) -> Self {
        Self::RuleParse {
            line,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Stable machine-readable code surfaced to the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosisError::InvalidInput { .. } => "INVALID_INPUT",
            DiagnosisError::SessionRequired => "SESSION_REQUIRED",
            DiagnosisError::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            DiagnosisError::RuleParse { .. } => "RULE_PARSE",
            DiagnosisError::Config { .. } => "CONFIG",
            // Collaborator and infrastructure failures all surface as a generic internal error
            DiagnosisError::Knowledge { .. }
            | DiagnosisError::Io { .. }
            | DiagnosisError::Serialization { .. } => "INTERNAL",
        }
    }

    /// Message safe to show to an end user.
    ///
    /// Internal failures are reported generically; details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.code() {
            "INTERNAL" => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Returns true if the caller can retry or correct the request
    pub fn is_recoverable(&self) -> bool {
        match self {
            DiagnosisError::InvalidInput { .. } => true,
            DiagnosisError::SessionRequired => true,
            DiagnosisError::SessionNotFound { .. } => true,
            // A failed knowledge read is reported upward so the whole turn can be retried
            DiagnosisError::Knowledge { .. } => true,
            DiagnosisError::Io { .. } => true,
            DiagnosisError::RuleParse { .. } => true,
            DiagnosisError::Config { .. } => false,
            DiagnosisError::Serialization { .. } => false,
        }
    }

    /// Returns the error severity level for logging
    pub fn severity(&self) -> tracing::Level {
        match self {
            DiagnosisError::Knowledge { .. } => tracing::Level::ERROR,
            DiagnosisError::Config { .. } => tracing::Level::ERROR,
            DiagnosisError::Serialization { .. } => tracing::Level::ERROR,
            DiagnosisError::Io { .. } => tracing::Level::WARN,
            DiagnosisError::RuleParse { .. } => tracing::Level::WARN,
            DiagnosisError::InvalidInput { .. } => tracing::Level::INFO,
            DiagnosisError::SessionRequired => tracing::Level::INFO,
            DiagnosisError::SessionNotFound { .. } => tracing::Level::INFO,
        }
    }
}

/// Result type alias using DiagnosisError
pub type Result<T> = std::result::Result<T, DiagnosisError>;

impl From<std::io::Error> for DiagnosisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for DiagnosisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for DiagnosisError {
    fn from(err: regex::Error) -> Self {
        Self::Knowledge {
            source_name: "pattern".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DiagnosisError::invalid_input("x").code(), "INVALID_INPUT");
        assert_eq!(DiagnosisError::SessionRequired.code(), "SESSION_REQUIRED");
        assert_eq!(
            DiagnosisError::session_not_found("sess_1").code(),
            "SESSION_NOT_FOUND"
        );
        assert_eq!(DiagnosisError::knowledge("rules", "down").code(), "INTERNAL");
        assert_eq!(DiagnosisError::serialization("bad").code(), "INTERNAL");
    }

    #[test]
    fn test_public_message_hides_internal_details() {
        let err = DiagnosisError::knowledge("rules.json", "connection refused");
        assert_eq!(err.public_message(), "Internal server error");

        let err = DiagnosisError::invalid_input("Message must be at least 3 characters long");
        assert!(err.public_message().contains("at least 3 characters"));
    }

    #[test]
    fn test_session_not_found_display() {
        let err = DiagnosisError::session_not_found("sess_abc");
        assert!(err.to_string().contains("sess_abc"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_severity_levels() {
        assert_eq!(
            DiagnosisError::knowledge("rules", "x").severity(),
            tracing::Level::ERROR
        );
        assert_eq!(
            DiagnosisError::invalid_input("x").severity(),
            tracing::Level::INFO
        );
    }

    #[test]
    fn test_error_recoverability() {
        assert!(DiagnosisError::invalid_input("short").is_recoverable());
        assert!(DiagnosisError::knowledge("rules", "timeout").is_recoverable());
        assert!(!DiagnosisError::config("bad threshold").is_recoverable());
        assert!(!DiagnosisError::serialization("corrupt").is_recoverable());
    }

    #[test]
    fn test_error_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let converted: DiagnosisError = io_err.into();
        assert!(matches!(converted, DiagnosisError::Io { .. }));

        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let converted: DiagnosisError = json_err.into();
        assert!(matches!(converted, DiagnosisError::Serialization { .. }));
    }
}
