// Error types for the Tessera negotiation engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A metadata name contained an illegal character, separator or parameter.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// A preference quality outside `[0, 1]`.
    #[error("Invalid quality: {0} (expected a value between 0 and 1)")]
    InvalidQuality(f32),

    /// An operation that needs at least one argument received none.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// No variant satisfies the client preferences.
    #[error("Not Acceptable: {0}")]
    NotAcceptable(String),
}

impl Error {
    /// Get the HTTP status code a server would answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidMetadata(_) => 400,
            Error::InvalidQuality(_) => 400,
            Error::EmptyInput(_) => 500,
            Error::NotAcceptable(_) => 406,
        }
    }

    /// Check if this error was caused by caller-supplied input.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this error is a server-side error.
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    pub(crate) fn invalid(kind: &str, name: &str, reason: impl std::fmt::Display) -> Self {
        Error::InvalidMetadata(format!("{} '{}': {}", kind, name, reason))
    }
}

/// Result type used throughout `tessera-core`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidMetadata("x".into()).status_code(), 400);
        assert_eq!(Error::InvalidQuality(1.5).status_code(), 400);
        assert_eq!(Error::EmptyInput("x".into()).status_code(), 500);
        assert_eq!(Error::NotAcceptable("x".into()).status_code(), 406);
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::NotAcceptable("none".into()).is_client_error());
        assert!(!Error::NotAcceptable("none".into()).is_server_error());
        assert!(Error::EmptyInput("none".into()).is_server_error());
    }

    #[test]
    fn test_display() {
        let err = Error::invalid("media type", "text/ht ml", "illegal character ' '");
        assert_eq!(
            err.to_string(),
            "Invalid metadata: media type 'text/ht ml': illegal character ' '"
        );
        assert_eq!(
            Error::InvalidQuality(2.0).to_string(),
            "Invalid quality: 2 (expected a value between 0 and 1)"
        );
    }
}
