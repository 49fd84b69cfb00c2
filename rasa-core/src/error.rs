//! Error types for RASA operations

/// Result type for RASA operations
pub type Result<T> = std::result::Result<T, RasaError>;

/// Error types for the RASA core
#[derive(Debug, thiserror::Error)]
pub enum RasaError {
    /// A required field was empty or whitespace-only
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Knowledge backend failure (e.g. a poisoned lock)
    #[error("Knowledge backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RasaError {
    /// Shorthand for an `InvalidInput` error naming the offending field
    pub fn blank(field: &str) -> Self {
        RasaError::InvalidInput(format!("'{}' must not be empty or whitespace-only", field))
    }

    /// Whether this error was caused by caller input rather than the system
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RasaError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_message_names_field() {
        let err = RasaError::blank("topic");
        assert!(err.is_invalid_input());
        assert_eq!(
            err.to_string(),
            "Invalid input: 'topic' must not be empty or whitespace-only"
        );
    }

    #[test]
    fn test_backend_is_not_invalid_input() {
        assert!(!RasaError::Backend("lock poisoned".into()).is_invalid_input());
    }
}
