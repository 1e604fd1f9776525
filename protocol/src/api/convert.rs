//! Conversion API DTOs
//!
//! This module contains data transfer objects for the conversion endpoints:
//! single-object and batch conversion, job status polling, server-side
//! validation, and capability discovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::common::ConvertOptions;

// ============================================================================
// Conversion DTOs
// ============================================================================

/// Single-object conversion request
///
/// Used for POST /convert/json-to-zip; the response body is the archive itself
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub data: Value,
    #[validate(length(min = 1, max = 255))]
    pub filename: Option<String>,
    #[serde(default)]
    pub options: ConvertOptions,
}

/// Batch conversion request
///
/// Used for POST /convert/batch-json-to-zip; every entry becomes one archive
/// member. The response body is the archive itself.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchConvertRequest {
    #[validate(length(min = 1, max = 100))]
    pub data: Vec<Value>,
    #[validate(length(min = 1, max = 255))]
    pub filename: Option<String>,
    #[serde(default)]
    pub options: ConvertOptions,
}

// ============================================================================
// Job Status DTOs
// ============================================================================

/// Lifecycle state of an asynchronous conversion job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Job status response
///
/// Response for GET /convert/status/{jobId}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobState,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Validation DTOs
// ============================================================================

/// Server-side validation request
///
/// Used for POST /validate/json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub data: Value,
}

/// Server-side validation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ============================================================================
// Capability DTOs
// ============================================================================

/// One output format the service can produce
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveFormat {
    pub name: String,
    pub extension: String,
    pub content_type: String,
}

/// Capability descriptor
///
/// Response for GET /formats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatsResponse {
    pub formats: Vec<ArchiveFormat>,
    #[serde(default)]
    pub compression_methods: Vec<String>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub max_batch_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_request_wire_shape() {
        let request = ConvertRequest {
            data: json!({"a": 1}),
            filename: Some("report".to_string()),
            options: ConvertOptions::default(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["data"]["a"], 1);
        assert_eq!(value["filename"], "report");
        assert_eq!(value["options"]["compression"], "DEFLATE");
    }

    #[test]
    fn test_status_response_decodes_minimal_body() {
        let status: JobStatusResponse = serde_json::from_value(json!({
            "jobId": "job-42",
            "status": "processing"
        }))
        .unwrap();
        assert_eq!(status.job_id, "job-42");
        assert_eq!(status.status, JobState::Processing);
        assert!(status.progress.is_none());
        assert!(status.download_url.is_none());
    }

    #[test]
    fn test_validate_response_decodes_camel_case() {
        let response: ValidateResponse = serde_json::from_value(json!({
            "isValid": false,
            "errors": ["Invalid JSON format"]
        }))
        .unwrap();
        assert!(!response.is_valid);
        assert_eq!(response.errors, vec!["Invalid JSON format"]);
    }

    #[test]
    fn test_formats_response_tolerates_missing_limits() {
        let response: FormatsResponse = serde_json::from_value(json!({
            "formats": [{"name": "zip", "extension": "zip", "contentType": "application/zip"}]
        }))
        .unwrap();
        assert_eq!(response.formats.len(), 1);
        assert_eq!(response.formats[0].extension, "zip");
        assert!(response.max_file_size.is_none());
    }
}
