//! # Error Types
//!
//! Error taxonomy shared by routers, backends and storage implementations.

/// Custom result type for logical backend operations
pub type Result<T> = std::result::Result<T, LogicalError>;

/// Main error type for request dispatch
#[derive(thiserror::Error, Debug)]
pub enum LogicalError {
    /// The backend does not implement the requested operation at all
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    /// The backend implements the operation, but not for this path
    #[error("unsupported path: {path}")]
    UnsupportedPath { path: String },

    /// The request is malformed for the handler that received it
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// A backend is already mounted at (or overlapping) the given path
    #[error("mount conflict: {path}")]
    MountConflict { path: String },

    /// Storage capability failures
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LogicalError {
    /// Create an unsupported operation error
    pub fn unsupported_operation<S: Into<String>>(operation: S) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Create an unsupported path error
    pub fn unsupported_path<S: Into<String>>(path: S) -> Self {
        Self::UnsupportedPath { path: path.into() }
    }

    /// Create an invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a mount conflict error
    pub fn mount_conflict<S: Into<String>>(path: S) -> Self {
        Self::MountConflict { path: path.into() }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error with source
    pub fn storage_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(source: serde_json::Error, context: S) -> Self {
        Self::Serialization {
            source,
            context: context.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, LogicalError::UnsupportedOperation { .. })
    }

    pub fn is_unsupported_path(&self) -> bool {
        matches!(self, LogicalError::UnsupportedPath { .. })
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, LogicalError::InvalidRequest { .. })
    }

    /// Get the HTTP status code a request surface should report for this error
    pub fn status_code(&self) -> u16 {
        match self {
            LogicalError::UnsupportedOperation { .. } => 405,
            LogicalError::UnsupportedPath { .. } => 404,
            LogicalError::InvalidRequest { .. } => 400,
            LogicalError::MountConflict { .. } => 409,
            LogicalError::Storage { .. } => 500,
            LogicalError::Serialization { .. } => 400,
            LogicalError::Config { .. } => 500,
            LogicalError::Validation { .. } => 400,
            LogicalError::Internal { .. } => 500,
        }
    }

    /// Check if this error may succeed on a later attempt.
    ///
    /// The router never retries on its own; this is a hint for external callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LogicalError::Storage { .. })
    }
}

impl From<serde_json::Error> for LogicalError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            source: error,
            context: "JSON serialization failed".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for LogicalError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
