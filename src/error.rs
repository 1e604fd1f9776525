//! Unified error handling system for the jzip CLI and SDK
//!
//! This module provides a single error type with:
//! - Unique error codes for debugging and documentation
//! - Structured error information with context
//! - Convenient constructor methods
//! - Automatic conversions from common error types

use std::fmt;
use thiserror::Error;

/// Unified Result type for all jzip operations
pub type Result<T> = std::result::Result<T, JzipError>;

/// Error codes for jzip operations
///
/// Each error has a unique code in the format `ZXXX` where:
/// - Z1XX: Validation and input errors
/// - Z2XX: Network and API errors
/// - Z3XX: File and I/O errors
/// - Z4XX: Configuration errors
/// - Z8XX: UI and interaction errors
/// - Z9XX: Internal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (Z1XX)
    /// Z101: Invalid input
    InvalidInput,
    /// Z102: Validation failed
    ValidationFailed,
    /// Z103: Invalid JSON payload
    InvalidJson,
    /// Z104: File type not in the allow-list
    FileTypeNotAllowed,
    /// Z105: File exceeds the size limit
    FileTooLarge,
    /// Z106: No files offered for intake
    EmptySelection,

    // Network (Z2XX)
    /// Z201: HTTP request failed
    HttpError,
    /// Z202: Request timed out
    ConnectionTimeout,
    /// Z203: Connection refused
    ConnectionRefused,
    /// Z204: API returned error response
    ApiError,
    /// Z205: Invalid API response format
    InvalidResponse,

    // File/IO (Z3XX)
    /// Z301: File not found
    FileNotFound,
    /// Z302: File read error
    FileReadError,
    /// Z303: File write error
    FileWriteError,
    /// Z304: File already exists
    FileAlreadyExists,

    // Configuration (Z4XX)
    /// Z401: Configuration error
    ConfigError,
    /// Z402: Invalid endpoint URL
    InvalidEndpoint,

    // UI (Z8XX)
    /// Z801: Dialog error
    DialogError,
    /// Z802: User cancelled
    UserCancelled,

    // Internal (Z9XX)
    /// Z901: Serialization error
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u16 {
        match self {
            // Validation (Z1XX)
            ErrorCode::InvalidInput => 101,
            ErrorCode::ValidationFailed => 102,
            ErrorCode::InvalidJson => 103,
            ErrorCode::FileTypeNotAllowed => 104,
            ErrorCode::FileTooLarge => 105,
            ErrorCode::EmptySelection => 106,

            // Network (Z2XX)
            ErrorCode::HttpError => 201,
            ErrorCode::ConnectionTimeout => 202,
            ErrorCode::ConnectionRefused => 203,
            ErrorCode::ApiError => 204,
            ErrorCode::InvalidResponse => 205,

            // File/IO (Z3XX)
            ErrorCode::FileNotFound => 301,
            ErrorCode::FileReadError => 302,
            ErrorCode::FileWriteError => 303,
            ErrorCode::FileAlreadyExists => 304,

            // Configuration (Z4XX)
            ErrorCode::ConfigError => 401,
            ErrorCode::InvalidEndpoint => 402,

            // UI (Z8XX)
            ErrorCode::DialogError => 801,
            ErrorCode::UserCancelled => 802,

            // Internal (Z9XX)
            ErrorCode::SerializationError => 901,
        }
    }

    /// Get the string code (e.g., "Z101")
    pub fn as_str(&self) -> String {
        format!("Z{}", self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z{}", self.code())
    }
}

/// Main error type for all jzip operations
#[derive(Error, Debug)]
pub enum JzipError {
    // ==================== Validation Errors (Z1XX) ====================
    /// Validation error
    #[error("[{code}] Validation error: {message}")]
    Validation {
        code: ErrorCode,
        message: String,
        filename: Option<String>,
    },

    /// Invalid input error
    #[error("[{code}] Invalid input: {message}")]
    InvalidInput { code: ErrorCode, message: String },

    // ==================== Network Errors (Z2XX) ====================
    /// HTTP/Network error
    #[error("[{code}] Network error: {message}")]
    Network {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// API error with status code and optional structured payload
    #[error("[{code}] API error ({status}): {message}")]
    Api {
        code: ErrorCode,
        status: u16,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Timeout error, kept distinct from other network failures
    #[error("[Z202] Request timed out")]
    Timeout,

    // ==================== File/IO Errors (Z3XX) ====================
    /// File or IO error
    #[error("[{code}] {context}: {message}")]
    Io {
        code: ErrorCode,
        context: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // ==================== Configuration Errors (Z4XX) ====================
    /// Configuration error
    #[error("[{code}] Configuration error: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<config::ConfigError>,
    },

    // ==================== UI Errors (Z8XX) ====================
    /// UI/Dialog error
    #[error("[{code}] UI error: {message}")]
    Ui { code: ErrorCode, message: String },

    // ==================== Internal Errors (Z9XX) ====================
    /// JSON serialization error
    #[error("[{code}] Serialization error: {message}")]
    Serialization {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

// ==================== Constructor Methods ====================

impl JzipError {
    // --- Validation ---

    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            filename: None,
        }
    }

    /// Create validation error attributed to a specific file
    pub fn validation_for_file(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        let filename = filename.into();
        Self::Validation {
            code: ErrorCode::ValidationFailed,
            message: format!("{}: {}", filename, reason.into()),
            filename: Some(filename),
        }
    }

    /// Create invalid JSON error
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::InvalidJson,
            message: message.into(),
            filename: None,
        }
    }

    /// Create file type error
    pub fn file_type_not_allowed(
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let filename = filename.into();
        Self::Validation {
            code: ErrorCode::FileTypeNotAllowed,
            message: format!(
                "File type '{}' is not allowed for '{}'",
                content_type.into(),
                filename
            ),
            filename: Some(filename),
        }
    }

    /// Create file size error
    pub fn file_too_large(filename: impl Into<String>, size: u64, max_size: u64) -> Self {
        let filename = filename.into();
        Self::Validation {
            code: ErrorCode::FileTooLarge,
            message: format!(
                "'{}' is {} bytes, which exceeds the {} byte limit",
                filename, size, max_size
            ),
            filename: Some(filename),
        }
    }

    /// Create empty selection error
    pub fn empty_selection() -> Self {
        Self::Validation {
            code: ErrorCode::EmptySelection,
            message: "No files provided".to_string(),
            filename: None,
        }
    }

    /// Create invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            code: ErrorCode::InvalidInput,
            message: message.into(),
        }
    }

    // --- Network ---

    /// Create network error from message
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            code: ErrorCode::HttpError,
            message: message.into(),
            source: None,
        }
    }

    /// Create network error from reqwest error
    ///
    /// A timed-out request maps to the dedicated `Timeout` variant so callers
    /// can tell it apart from other network failures.
    pub fn network_from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }

        let code = if err.is_connect() {
            ErrorCode::ConnectionRefused
        } else {
            ErrorCode::HttpError
        };

        Self::Network {
            code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code: ErrorCode::ApiError,
            status,
            message: message.into(),
            data: None,
        }
    }

    /// Create API error with the parsed error body attached
    pub fn api_with_data(
        status: u16,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self::Api {
            code: ErrorCode::ApiError,
            status,
            message: message.into(),
            data,
        }
    }

    /// Create invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::Api {
            code: ErrorCode::InvalidResponse,
            status: 0,
            message: message.into(),
            data: None,
        }
    }

    // --- File/IO ---

    /// Create IO error from std::io::Error
    pub fn io_from_error(context: impl Into<String>, err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::FileWriteError,
            std::io::ErrorKind::AlreadyExists => ErrorCode::FileAlreadyExists,
            _ => ErrorCode::FileReadError,
        };

        Self::Io {
            code,
            context: context.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::Io {
            code: ErrorCode::FileNotFound,
            context: "File not found".to_string(),
            message: path.into(),
            source: None,
        }
    }

    /// Create file already exists error
    pub fn file_already_exists(path: impl Into<String>) -> Self {
        Self::Io {
            code: ErrorCode::FileAlreadyExists,
            context: "File already exists".to_string(),
            message: path.into(),
            source: None,
        }
    }

    // --- Configuration ---

    /// Create invalid endpoint error
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::InvalidEndpoint,
            message: message.into(),
            source: None,
        }
    }

    // --- UI ---

    /// Create user cancelled error
    pub fn user_cancelled() -> Self {
        Self::Ui {
            code: ErrorCode::UserCancelled,
            message: "Operation cancelled by user".to_string(),
        }
    }

    // --- Internal ---

    /// Create serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            message: message.into(),
            source: None,
        }
    }

    // --- Utility Methods ---

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::InvalidInput { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Api { code, .. } => *code,
            Self::Timeout => ErrorCode::ConnectionTimeout,
            Self::Io { code, .. } => *code,
            Self::Config { code, .. } => *code,
            Self::Ui { code, .. } => *code,
            Self::Serialization { code, .. } => *code,
        }
    }

    /// The bare message, without the code prefix the Display impl adds
    ///
    /// Used where errors are surfaced per file and the prefix would repeat.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::InvalidInput { message, .. }
            | Self::Network { message, .. }
            | Self::Api { message, .. }
            | Self::Config { message, .. }
            | Self::Ui { message, .. }
            | Self::Serialization { message, .. } => message.clone(),
            Self::Io {
                context, message, ..
            } => format!("{}: {}", context, message),
            Self::Timeout => "Request timed out".to_string(),
        }
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidInput { .. })
    }

    /// Check if this is a network error
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Api { .. } | Self::Timeout)
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Check if the remote service reported a caller mistake (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (400..500).contains(status))
    }

    /// Check if the remote service itself failed (5xx)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (500..600).contains(status))
    }
}

// ==================== From Implementations ====================

impl From<std::io::Error> for JzipError {
    fn from(err: std::io::Error) -> Self {
        Self::io_from_error("IO operation", err)
    }
}

impl From<reqwest::Error> for JzipError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_from_reqwest(err)
    }
}

impl From<serde_json::Error> for JzipError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            code: ErrorCode::SerializationError,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<config::ConfigError> for JzipError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config {
            code: ErrorCode::ConfigError,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<dialoguer::Error> for JzipError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Ui {
            code: ErrorCode::DialogError,
            message: format!("Dialog error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::InvalidInput.code(), 101);
        assert_eq!(ErrorCode::HttpError.code(), 201);
        assert_eq!(ErrorCode::FileNotFound.code(), 301);
        assert_eq!(ErrorCode::ConfigError.code(), 401);
    }

    #[test]
    fn test_error_code_string() {
        assert_eq!(ErrorCode::FileTypeNotAllowed.as_str(), "Z104");
        assert_eq!(ErrorCode::ConnectionTimeout.as_str(), "Z202");
    }

    #[test]
    fn test_error_display() {
        let err = JzipError::file_too_large("big.json", 20, 10);
        assert!(err.to_string().contains("Z105"));
        assert!(err.to_string().contains("big.json"));
    }

    #[test]
    fn test_timeout_is_distinct_from_network_failure() {
        let timeout = JzipError::Timeout;
        assert!(timeout.is_timeout());
        assert!(timeout.is_network_error());
        assert_eq!(timeout.code(), ErrorCode::ConnectionTimeout);

        let network = JzipError::network("connection reset");
        assert!(!network.is_timeout());
        assert!(network.is_network_error());
        assert_eq!(network.code(), ErrorCode::HttpError);
    }

    #[test]
    fn test_client_vs_server_classification() {
        let client = JzipError::api(422, "bad payload");
        assert!(client.is_client_error());
        assert!(!client.is_server_error());

        let server = JzipError::api(503, "unavailable");
        assert!(server.is_server_error());
        assert!(!server.is_client_error());
    }

    #[test]
    fn test_user_message_strips_code_prefix() {
        let err = JzipError::validation("Data is required");
        assert_eq!(err.user_message(), "Data is required");
        assert_ne!(err.user_message(), err.to_string());
    }
}
