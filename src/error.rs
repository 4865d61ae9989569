//! Error types and handling for the Elvia coordinator
//!
//! Fetch failures abort an update cycle, structural gaps inside a payload are
//! downgraded where they are found, and configuration problems surface at
//! construction time.

use thiserror::Error;

/// Result type alias for Elvia operations
pub type Result<T> = std::result::Result<T, ElviaError>;

/// Main error type for the Elvia coordinator
#[derive(Debug, Error)]
pub enum ElviaError {
    /// Missing or unusable setup data (metering point id, tariff metadata)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport failures talking to the Elvia APIs
    #[error("Network error: {message}")]
    Network { message: String },

    /// Non-success responses from the Elvia APIs
    #[error("API error: {message}")]
    Api { message: String },

    /// Rejected credentials
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Request exceeded the client timeout
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Expected nested field absent from a payload
    #[error("Structure error: {message}")]
    Structure { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl ElviaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new structure error
    pub fn structure<S: Into<String>>(message: S) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Whether this error comes from fetching or decoding an API response.
    ///
    /// These are the only errors allowed to abort an update cycle.
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Api { .. }
                | Self::Auth { .. }
                | Self::Timeout { .. }
                | Self::Serialization { .. }
        )
    }
}

impl From<std::io::Error> for ElviaError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ElviaError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ElviaError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<chrono_tz::ParseError> for ElviaError {
    fn from(err: chrono_tz::ParseError) -> Self {
        Self::validation("timezone", err.to_string())
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for ElviaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(err.to_string())
        } else if err.is_decode() {
            Self::serialization(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ElviaError::config("missing metering point id");
        assert!(matches!(err, ElviaError::Config { .. }));

        let err = ElviaError::structure("gridTariff absent");
        assert!(matches!(err, ElviaError::Structure { .. }));

        let err = ElviaError::validation("timezone", "unknown zone");
        assert!(matches!(err, ElviaError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = ElviaError::config("test error");
        assert_eq!(err.to_string(), "Configuration error: test error");

        let err = ElviaError::validation("poll_interval_ms", "Must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Validation error: poll_interval_ms - Must be greater than 0"
        );
    }

    #[test]
    fn fetch_failures_are_classified() {
        assert!(ElviaError::network("x").is_fetch_failure());
        assert!(ElviaError::timeout("x").is_fetch_failure());
        assert!(ElviaError::auth("x").is_fetch_failure());
        assert!(ElviaError::serialization("x").is_fetch_failure());
        assert!(!ElviaError::config("x").is_fetch_failure());
        assert!(!ElviaError::structure("x").is_fetch_failure());
    }
}
