//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration: \"{input}\". Use h, m and s components, largest first (e.g. 45s, 2m30s, 1h15m)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an unknown container format is requested
#[derive(Debug, Clone, Error)]
#[error("Invalid container: \"{input}\". Valid containers are: webm, mkv")]
pub struct InvalidContainerError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_error_lists_valid_values() {
        let err = InvalidContainerError {
            input: "avi".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("avi"));
        assert!(msg.contains("webm"));
        assert!(msg.contains("mkv"));
    }

    #[test]
    fn validation_error_names_key() {
        let err = ConfigError::ValidationError {
            key: "framerate".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'framerate': must be positive"
        );
    }
}
