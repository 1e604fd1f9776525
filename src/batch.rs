//! Sequential multi-file JSON parsing

use serde_json::Value;

use crate::error::{JzipError, Result};
use crate::file::{read_file_as_text, CandidateFile};
use crate::validation::{
    validate_file_size, validate_file_type, DEFAULT_ALLOWED_TYPES, MSG_DATA_REQUIRED,
    MSG_INVALID_JSON, MSG_NOT_OBJECT_OR_ARRAY,
};

/// A successfully parsed batch entry, held only for the duration of the batch
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub filename: String,
    pub data: Value,
    pub size: u64,
}

/// Parse a list of candidate JSON files, strictly in input order
///
/// Each file is checked for type and size, read, and structurally validated
/// before the next one is touched. The first failing file aborts the whole
/// batch with an error naming the file and the reason; no partial results
/// are ever returned.
pub async fn parse_json_files(
    files: &[CandidateFile],
    max_file_size: u64,
) -> Result<Vec<ParsedFile>> {
    let mut parsed = Vec::with_capacity(files.len());

    for file in files {
        validate_file_type(file, DEFAULT_ALLOWED_TYPES)
            .map_err(|e| JzipError::validation_for_file(&file.name, e.user_message()))?;
        validate_file_size(file, max_file_size)
            .map_err(|e| JzipError::validation_for_file(&file.name, e.user_message()))?;

        let text = read_file_as_text(file)
            .await
            .map_err(|e| JzipError::validation_for_file(&file.name, e.user_message()))?;

        if text.trim().is_empty() {
            return Err(JzipError::validation_for_file(&file.name, MSG_DATA_REQUIRED));
        }

        let data = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(_) => {
                return Err(JzipError::validation_for_file(&file.name, MSG_INVALID_JSON));
            }
        };

        if !data.is_object() && !data.is_array() {
            return Err(JzipError::validation_for_file(
                &file.name,
                MSG_NOT_OBJECT_OR_ARRAY,
            ));
        }

        parsed.push(ParsedFile {
            filename: file.name.clone(),
            data,
            size: file.size,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::*;
    use crate::validation::DEFAULT_MAX_FILE_SIZE;

    #[tokio::test]
    async fn test_parse_preserves_input_order() {
        let temp_dir = create_temp_dir();
        let first = candidate_with_content(&temp_dir, "first.json", b"{\"n\":1}").await;
        let second = candidate_with_content(&temp_dir, "second.json", b"[2]").await;

        let parsed = parse_json_files(&[first, second], DEFAULT_MAX_FILE_SIZE)
            .await
            .unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].filename, "first.json");
        assert_eq!(parsed[0].data["n"], 1);
        assert_eq!(parsed[1].filename, "second.json");
        assert_eq!(parsed[1].size, 3);
    }

    #[tokio::test]
    async fn test_fail_fast_names_offending_file() {
        let temp_dir = create_temp_dir();
        let valid = candidate_with_content(&temp_dir, "valid.json", b"{\"a\":1}").await;
        let invalid = candidate_with_content(&temp_dir, "invalid.json", b"not json").await;

        let err = parse_json_files(&[valid, invalid], DEFAULT_MAX_FILE_SIZE)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("invalid.json"));
        assert!(message.contains("Invalid JSON format"));
    }

    #[tokio::test]
    async fn test_first_error_wins() {
        let temp_dir = create_temp_dir();
        let broken_a = candidate_with_content(&temp_dir, "a.json", b"{oops").await;
        let broken_b = candidate_with_content(&temp_dir, "b.json", b"also bad").await;

        let err = parse_json_files(&[broken_a, broken_b], DEFAULT_MAX_FILE_SIZE)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("a.json"));
        assert!(!err.to_string().contains("b.json"));
    }

    #[tokio::test]
    async fn test_rejects_scalar_payload() {
        let temp_dir = create_temp_dir();
        let scalar = candidate_with_content(&temp_dir, "scalar.json", b"42").await;

        let err = parse_json_files(&[scalar], DEFAULT_MAX_FILE_SIZE)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(MSG_NOT_OBJECT_OR_ARRAY));
    }

    #[tokio::test]
    async fn test_rejects_empty_file() {
        let temp_dir = create_temp_dir();
        let empty = candidate_with_content(&temp_dir, "empty.json", b"").await;

        let err = parse_json_files(&[empty], DEFAULT_MAX_FILE_SIZE)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(MSG_DATA_REQUIRED));
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let temp_dir = create_temp_dir();
        let file = candidate_with_content(&temp_dir, "big.json", b"{\"k\":\"value\"}").await;

        let err = parse_json_files(&[file], 4).await.unwrap_err();
        assert!(err.to_string().contains("big.json"));
        assert!(err.to_string().contains("exceeds"));
    }

    #[tokio::test]
    async fn test_rejects_disallowed_type() {
        let temp_dir = create_temp_dir();
        let file = candidate_with_content(&temp_dir, "image.png", b"{}").await;

        let err = parse_json_files(&[file], DEFAULT_MAX_FILE_SIZE)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("image.png"));
        assert!(err.to_string().contains("not allowed"));
    }
}
