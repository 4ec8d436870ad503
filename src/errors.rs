//! Error types for document assembly.

use thiserror::Error;

/// Result type alias for assembly operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for assembly operations
#[derive(Debug, Error)]
pub enum Error {
    /// Config location with an unknown prefix
    #[error("Unsupported config location format: {0}")]
    UnsupportedConfigLocation(String),

    /// Textual value that does not match its declared type/format
    #[error("can't parse value {value} with type {type_name} and format {format}")]
    InvalidValue {
        value: String,
        type_name: String,
        format: String,
    },

    /// Validation error
    #[error("validation error: field={field} message={message}")]
    Validation { field: String, message: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error
    #[cfg(feature = "yaml")]
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Custom error for extensibility
    #[error("custom error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a new unsupported config location error
    pub fn unsupported_config_location(location: impl Into<String>) -> Self {
        Error::UnsupportedConfigLocation(location.into())
    }

    /// Creates a new invalid value error
    pub fn invalid_value(
        value: impl Into<String>,
        type_name: impl Into<String>,
        format: Option<&str>,
    ) -> Self {
        Error::InvalidValue {
            value: value.into(),
            type_name: type_name.into(),
            format: format.unwrap_or("null").to_string(),
        }
    }

    /// Creates a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error must abort processing instead of degrading a single fragment
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::UnsupportedConfigLocation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::unsupported_config_location("http://foo");
        assert_eq!(
            err.to_string(),
            "Unsupported config location format: http://foo"
        );

        let err = Error::invalid_value("abc", "integer", Some("int32"));
        assert_eq!(
            err.to_string(),
            "can't parse value abc with type integer and format int32"
        );
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("field_name", "field is required");
        assert!(err.to_string().contains("field_name"));
        assert!(err.to_string().contains("field is required"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::unsupported_config_location("x").is_fatal());
        assert!(!Error::invalid_value("x", "integer", None).is_fatal());
        assert!(!Error::Custom("x".into()).is_fatal());
    }
}
