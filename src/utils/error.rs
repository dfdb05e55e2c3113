use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("No executor available: {message}")]
    NoExecutor { message: String },

    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Transfer failed: {message}")]
    TransferError { message: String },
}

impl ObjError {
    pub fn transfer(message: impl Into<String>) -> Self {
        ObjError::TransferError {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ObjError::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ObjError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_config_value_message() {
        let error = ObjError::InvalidConfigValueError {
            field: "bucket".to_string(),
            value: "A".to_string(),
            reason: "too short".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid value 'A' for bucket: too short");
    }

    #[test]
    fn test_transfer_helper() {
        let error = ObjError::transfer("connection reset");
        assert_eq!(error.to_string(), "Transfer failed: connection reset");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "params.toml");
        let error: ObjError = io_error.into();
        assert!(matches!(error, ObjError::IoError(_)));
        assert!(error.to_string().contains("IO error"));
    }
}
