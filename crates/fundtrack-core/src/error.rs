//! Error types for fundtrack-core
//!
//! Every failure a request can hit maps to a [`CoreError`]. Its
//! [`ErrorDetails`] are what clients see in the `error` field of a failed
//! response, so they carry a stable code alongside the message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Store could not be reached
    StoreUnavailable,
    /// Transaction id collided with an existing record
    DuplicateEntry,
    /// Stored data could not be decoded
    InvalidFormat,
    /// Any other store failure
    StorageError,
    /// Request body did not have the expected shape
    ValidationError,
    /// Email could not be built or delivered
    NotificationError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::NotificationError => write!(f, "NOTIFICATION_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - the request failed, the process is fine
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - a dependency is down
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for fundtrack-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Duplicate entry in {collection}: {entry}")]
    DuplicateEntry { collection: String, entry: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Notification error: {message}")]
    Notification { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::StoreUnavailable { .. } => ErrorCode::StoreUnavailable,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::Storage { .. } => ErrorCode::StorageError,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::Notification { .. } => ErrorCode::NotificationError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::StoreUnavailable { .. } => ErrorSeverity::Critical,
            CoreError::DuplicateEntry { .. } => ErrorSeverity::Error,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::Storage { .. } => ErrorSeverity::Error,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::Notification { .. } => ErrorSeverity::Warning,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::StoreUnavailable { .. } => {
                details = details.with_suggestion(
                    "Check that the database is running and MONGO_URI is correct.".to_string(),
                );
            }
            CoreError::DuplicateEntry { collection, .. } => {
                details = details.with_detail(serde_json::json!({ "collection": collection }));
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "reason": message }));
            }
            CoreError::Notification { .. } => {
                details = details.with_suggestion(
                    "Check EMAIL, EMAIL_PASS and ADMIN_EMAIL.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
