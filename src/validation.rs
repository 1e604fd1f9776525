//! Input validation for JSON payloads and candidate files

use serde_json::Value;

use crate::error::{JzipError, Result};
use crate::file::CandidateFile;

/// Content types accepted for conversion by default
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &["application/json", "text/plain"];

/// Default per-file size limit: 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const MSG_DATA_REQUIRED: &str = "Data is required";
pub const MSG_INVALID_JSON: &str = "Invalid JSON format";
pub const MSG_NOT_OBJECT_OR_ARRAY: &str = "JSON must be an object or array";

/// Outcome of a JSON payload validation
///
/// Recreated per call; errors keep the order in which checks failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// A JSON payload handed to validation: raw text or an already-parsed value
#[derive(Debug, Clone)]
pub enum JsonPayload {
    Text(String),
    Parsed(Value),
}

impl From<&str> for JsonPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for JsonPayload {
    fn from(value: Value) -> Self {
        Self::Parsed(value)
    }
}

/// True when the text parses as JSON; never errors
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

/// Validate a JSON payload for conversion
///
/// Empty text and JSON null are "missing data"; text that does not parse is
/// malformed; anything that parses to a scalar is the wrong shape for an
/// archive. Valid payloads are objects or arrays.
pub fn validate_json_data(payload: &JsonPayload) -> ValidationReport {
    let mut errors = Vec::new();

    match payload {
        JsonPayload::Text(text) => {
            if text.trim().is_empty() {
                errors.push(MSG_DATA_REQUIRED.to_string());
            } else {
                match serde_json::from_str::<Value>(text) {
                    Ok(value) => check_shape(&value, &mut errors),
                    Err(_) => errors.push(MSG_INVALID_JSON.to_string()),
                }
            }
        }
        JsonPayload::Parsed(value) => {
            if value.is_null() {
                errors.push(MSG_DATA_REQUIRED.to_string());
            } else {
                check_shape(value, &mut errors);
            }
        }
    }

    if errors.is_empty() {
        ValidationReport::valid()
    } else {
        ValidationReport::invalid(errors)
    }
}

fn check_shape(value: &Value, errors: &mut Vec<String>) {
    if !value.is_object() && !value.is_array() {
        errors.push(MSG_NOT_OBJECT_OR_ARRAY.to_string());
    }
}

/// Check a candidate's declared content type against an allow-list
///
/// The declared type comes from the extension, never from content sniffing.
pub fn validate_file_type(file: &CandidateFile, allowed_types: &[&str]) -> Result<()> {
    if allowed_types.iter().any(|t| *t == file.content_type) {
        Ok(())
    } else {
        Err(JzipError::file_type_not_allowed(
            &file.name,
            &file.content_type,
        ))
    }
}

/// Check a candidate's size against a limit
pub fn validate_file_size(file: &CandidateFile, max_size: u64) -> Result<()> {
    if file.size <= max_size {
        Ok(())
    } else {
        Err(JzipError::file_too_large(&file.name, file.size, max_size))
    }
}
