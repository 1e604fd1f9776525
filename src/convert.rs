//! Conversion operations against the remote service

use std::path::PathBuf;

use reqwest::Method;
use serde_json::Value;

use jzip_protocol::{
    BatchConvertRequest, ConvertOptions, ConvertRequest, FormatsResponse, JobStatusResponse,
    ValidateRequest, ValidateResponse,
};

use crate::batch::parse_json_files;
use crate::client::{ApiClient, Artifact};
use crate::error::{JzipError, Result};
use crate::file::{artifact_checksum, read_file_as_bytes, save_artifact, CandidateFile};
use crate::ui::{create_spinner, UI};
use crate::utils::{format_file_size, generate_filename, remove_file_extension, sanitize_filename};
use crate::validation::{validate_json_data, JsonPayload};

/// Where a downloaded artifact should land
#[derive(Debug, Clone)]
pub struct OutputTarget {
    /// Directory for generated names
    pub dir: PathBuf,
    /// Explicit output path, overriding naming entirely
    pub path: Option<PathBuf>,
    /// Overwrite an existing file without asking
    pub force: bool,
}

/// Service for all conversion endpoints
pub struct ConvertService<'a, C: ApiClient + ?Sized> {
    client: &'a C,
    ui: UI,
}

impl<'a, C: ApiClient + ?Sized> ConvertService<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            ui: UI::new(),
        }
    }

    /// Convert a single JSON payload and download the resulting archive
    ///
    /// The payload is validated locally before anything is sent.
    pub async fn convert_text(
        &self,
        text: &str,
        name: Option<&str>,
        options: ConvertOptions,
        target: &OutputTarget,
    ) -> Result<PathBuf> {
        let report = validate_json_data(&JsonPayload::Text(text.to_string()));
        if !report.is_valid {
            return Err(JzipError::validation(report.errors.join("; ")));
        }

        let data: Value = serde_json::from_str(text)?;
        let request = ConvertRequest {
            data,
            filename: name.map(str::to_string),
            options,
        };

        let spinner = create_spinner("Converting...");
        let result = self
            .client
            .request_binary(Method::POST, "/convert/json-to-zip", Some(&request))
            .await;
        spinner.finish_and_clear();

        self.deliver(result?, name, target).await
    }

    /// Upload a JSON file for conversion
    ///
    /// Type and size checks belong to intake; this re-reads the bytes and
    /// ships them as multipart form data.
    pub async fn convert_file(
        &self,
        file: &CandidateFile,
        name: Option<&str>,
        options: ConvertOptions,
        target: &OutputTarget,
    ) -> Result<PathBuf> {
        let bytes = read_file_as_bytes(file).await?;
        let options_json = serde_json::to_string(&options)?;

        self.ui.info(&format!(
            "Uploading {} ({})",
            file.name,
            file.formatted_size()
        ));

        let spinner = create_spinner("Converting...");
        let result = self
            .client
            .upload_file(
                "/convert/upload-json-to-zip",
                bytes,
                &file.name,
                name,
                options_json,
            )
            .await;
        spinner.finish_and_clear();

        let fallback = remove_file_extension(&file.name);
        self.deliver(result?, name.or(Some(fallback)), target).await
    }

    /// Convert a set of candidate JSON files into one archive
    ///
    /// Parsing is sequential and fail-fast; nothing is sent unless every
    /// file passes.
    pub async fn convert_batch(
        &self,
        files: &[CandidateFile],
        name: Option<&str>,
        options: ConvertOptions,
        max_file_size: u64,
        target: &OutputTarget,
    ) -> Result<PathBuf> {
        let parsed = parse_json_files(files, max_file_size).await?;
        let total: u64 = parsed.iter().map(|p| p.size).sum();
        self.ui.info(&format!(
            "Parsed {} files ({})",
            parsed.len(),
            format_file_size(total)
        ));

        let request = BatchConvertRequest {
            data: parsed.into_iter().map(|p| p.data).collect(),
            filename: name.map(str::to_string),
            options,
        };

        let spinner = create_spinner("Converting batch...");
        let result = self
            .client
            .request_binary(Method::POST, "/convert/batch-json-to-zip", Some(&request))
            .await;
        spinner.finish_and_clear();

        self.deliver(result?, name, target).await
    }

    /// Poll the status of a conversion job
    pub async fn status(&self, job_id: &str) -> Result<JobStatusResponse> {
        if job_id.trim().is_empty() {
            return Err(JzipError::invalid_input("Job id is required"));
        }

        self.client
            .request_json(
                Method::GET,
                &format!("/convert/status/{}", job_id),
                None::<&()>,
            )
            .await
    }

    /// Ask the service to validate a JSON payload
    pub async fn validate_remote(&self, data: Value) -> Result<ValidateResponse> {
        self.client
            .request_json(
                Method::POST,
                "/validate/json",
                Some(&ValidateRequest { data }),
            )
            .await
    }

    /// Discover service capabilities
    pub async fn formats(&self) -> Result<FormatsResponse> {
        self.client
            .request_json(Method::GET, "/formats", None::<&()>)
            .await
    }

    /// Resolve the output path and persist the artifact
    async fn deliver(
        &self,
        artifact: Artifact,
        name: Option<&str>,
        target: &OutputTarget,
    ) -> Result<PathBuf> {
        let path = match &target.path {
            Some(path) => path.clone(),
            None => {
                let filename = match name {
                    Some(n) => format!("{}.zip", sanitize_filename(remove_file_extension(n))),
                    None => match &artifact.filename {
                        Some(hint) => sanitize_filename(hint),
                        None => generate_filename("archive", "zip"),
                    },
                };
                target.dir.join(filename)
            }
        };

        if let Some(content_type) = &artifact.content_type {
            if !content_type.contains("zip") && !content_type.contains("octet-stream") {
                self.ui.warning(&format!(
                    "Unexpected artifact content type: {}",
                    content_type
                ));
            }
        }

        let saved = save_artifact(&artifact, &path, target.force).await?;

        self.ui.success(&format!(
            "Saved {} ({}, sha256 {})",
            saved.display(),
            format_file_size(artifact.bytes.len() as u64),
            &artifact_checksum(&artifact)[..16]
        ));

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mocks::MockApiClient;
    use crate::tests::utils::test_helpers::*;
    use crate::validation::DEFAULT_MAX_FILE_SIZE;
    use serde_json::json;

    fn target_in(dir: &tempfile::TempDir) -> OutputTarget {
        OutputTarget {
            dir: dir.path().to_path_buf(),
            path: None,
            force: true,
        }
    }

    #[tokio::test]
    async fn test_convert_text_downloads_artifact() {
        let temp_dir = create_temp_dir();
        let client = MockApiClient::new();
        client.add_binary_response("/convert/json-to-zip", zip_artifact(b"PK\x03\x04zip"));

        let service = ConvertService::new(&client);
        let saved = service
            .convert_text(
                r#"{"a":1}"#,
                Some("report"),
                ConvertOptions::default(),
                &target_in(&temp_dir),
            )
            .await
            .unwrap();

        assert_eq!(saved, temp_dir.path().join("report.zip"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04zip");
        assert_eq!(client.calls(), vec!["/convert/json-to-zip"]);
    }

    #[tokio::test]
    async fn test_convert_text_rejects_invalid_payload_before_sending() {
        let temp_dir = create_temp_dir();
        let client = MockApiClient::new();
        let service = ConvertService::new(&client);

        let err = service
            .convert_text(
                "not json",
                None,
                ConvertOptions::default(),
                &target_in(&temp_dir),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Invalid JSON format"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_convert_text_uses_disposition_hint() {
        let temp_dir = create_temp_dir();
        let client = MockApiClient::new();
        let mut artifact = zip_artifact(b"data");
        artifact.filename = Some("server-name.zip".to_string());
        client.add_binary_response("/convert/json-to-zip", artifact);

        let service = ConvertService::new(&client);
        let saved = service
            .convert_text(
                "[1,2]",
                None,
                ConvertOptions::default(),
                &target_in(&temp_dir),
            )
            .await
            .unwrap();

        assert_eq!(saved, temp_dir.path().join("server-name.zip"));
    }

    #[tokio::test]
    async fn test_convert_file_uploads_multipart() {
        let temp_dir = create_temp_dir();
        let candidate = candidate_with_content(&temp_dir, "input.json", b"{\"x\":true}").await;

        let client = MockApiClient::new();
        client.add_binary_response("/convert/upload-json-to-zip", zip_artifact(b"zipped"));

        let service = ConvertService::new(&client);
        let saved = service
            .convert_file(
                &candidate,
                None,
                ConvertOptions::default(),
                &target_in(&temp_dir),
            )
            .await
            .unwrap();

        // falls back to the input name without its extension
        assert_eq!(saved, temp_dir.path().join("input.zip"));
        let uploads = client.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].endpoint, "/convert/upload-json-to-zip");
        assert_eq!(uploads[0].file_name, "input.json");
        assert_eq!(uploads[0].filename_field, None);
        assert_eq!(uploads[0].byte_count, 10);
        assert!(uploads[0].options_json.contains("DEFLATE"));
    }

    #[tokio::test]
    async fn test_convert_batch_fails_fast_without_network() {
        let temp_dir = create_temp_dir();
        let valid = candidate_with_content(&temp_dir, "ok.json", b"{}").await;
        let invalid = candidate_with_content(&temp_dir, "broken.json", b"{nope").await;

        let client = MockApiClient::new();
        let service = ConvertService::new(&client);

        let err = service
            .convert_batch(
                &[valid, invalid],
                None,
                ConvertOptions::default(),
                DEFAULT_MAX_FILE_SIZE,
                &target_in(&temp_dir),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("broken.json"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_convert_batch_sends_all_parsed_values() {
        let temp_dir = create_temp_dir();
        let a = candidate_with_content(&temp_dir, "a.json", b"{\"id\":1}").await;
        let b = candidate_with_content(&temp_dir, "b.json", b"{\"id\":2}").await;

        let client = MockApiClient::new();
        client.add_binary_response("/convert/batch-json-to-zip", zip_artifact(b"batch"));

        let service = ConvertService::new(&client);
        service
            .convert_batch(
                &[a, b],
                Some("bundle"),
                ConvertOptions::default(),
                DEFAULT_MAX_FILE_SIZE,
                &target_in(&temp_dir),
            )
            .await
            .unwrap();

        assert_eq!(client.calls(), vec!["/convert/batch-json-to-zip"]);
    }

    #[tokio::test]
    async fn test_status_polls_job_endpoint() {
        let client = MockApiClient::new();
        client.add_json_response(
            "/convert/status/job-7",
            json!({"jobId": "job-7", "status": "completed", "progress": 100}),
        );

        let service = ConvertService::new(&client);
        let status = service.status("job-7").await.unwrap();
        assert_eq!(status.job_id, "job-7");
        assert_eq!(status.progress, Some(100));
    }

    #[tokio::test]
    async fn test_status_requires_job_id() {
        let client = MockApiClient::new();
        let service = ConvertService::new(&client);
        assert!(service.status("  ").await.is_err());
    }

    #[tokio::test]
    async fn test_validate_remote_decodes_verdict() {
        let client = MockApiClient::new();
        client.add_json_response(
            "/validate/json",
            json!({"isValid": false, "errors": ["JSON must be an object or array"]}),
        );

        let service = ConvertService::new(&client);
        let verdict = service.validate_remote(json!(42)).await.unwrap();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_formats_discovery() {
        let client = MockApiClient::new();
        client.add_json_response(
            "/formats",
            json!({
                "formats": [{"name": "zip", "extension": "zip", "contentType": "application/zip"}],
                "compressionMethods": ["DEFLATE", "STORE"]
            }),
        );

        let service = ConvertService::new(&client);
        let formats = service.formats().await.unwrap();
        assert_eq!(formats.formats[0].name, "zip");
        assert_eq!(formats.compression_methods, vec!["DEFLATE", "STORE"]);
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status() {
        let temp_dir = create_temp_dir();
        let client = MockApiClient::new();
        client.fail_endpoint("/convert/json-to-zip", 422, "unsupported structure");

        let service = ConvertService::new(&client);
        let err = service
            .convert_text(
                "[]",
                None,
                ConvertOptions::default(),
                &target_in(&temp_dir),
            )
            .await
            .unwrap_err();

        assert!(err.is_client_error());
        assert!(err.to_string().contains("unsupported structure"));
    }
}
