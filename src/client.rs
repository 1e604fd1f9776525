//! HTTP client implementations for the jzip SDK

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{JzipError, Result};

/// Binary payload returned by a successful conversion call
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    /// Filename hint from the Content-Disposition header, if any
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Client seam for the conversion API
///
/// Services talk to the API through this trait so tests can substitute a
/// mock transport.
#[allow(async_fn_in_trait)]
pub trait ApiClient {
    fn config(&self) -> &ClientConfig;

    /// Send a request expecting a JSON response body
    async fn request_json<T, R>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&T>,
    ) -> Result<R>
    where
        T: Serialize + Send + Sync + 'static,
        R: DeserializeOwned + Send + 'static;

    /// Send a request expecting a binary response body
    async fn request_binary<T>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&T>,
    ) -> Result<Artifact>
    where
        T: Serialize + Send + Sync + 'static;

    /// Upload a file as multipart form data, expecting a binary response
    async fn upload_file(
        &self,
        endpoint: &str,
        file_bytes: Vec<u8>,
        file_name: &str,
        filename_field: Option<&str>,
        options_json: String,
    ) -> Result<Artifact>;
}

/// HTTP client for the conversion service
///
/// The request timeout is applied at client construction; a request that
/// exceeds it fails with the dedicated timeout error.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder().timeout(Duration::from_secs(config.timeout));

        if !config.use_proxy {
            client_builder = client_builder.no_proxy();
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    fn builder<T: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&T>,
    ) -> reqwest::RequestBuilder {
        let url = self.config.endpoint_url(endpoint);
        tracing::debug!("{} {}", method, url);
        let mut request_builder = self.client.request(method, &url);

        if let Some(data) = payload {
            request_builder = request_builder.json(data);
        }

        request_builder
    }

    /// Turn a non-2xx response into a uniform API error
    ///
    /// JSON bodies keep their structured payload and contribute the
    /// `error`/`message` field as the message; anything else is surfaced as
    /// plain text.
    async fn error_from_response(response: Response) -> JzipError {
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        let body = response.text().await.unwrap_or_default();

        if is_json {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
                let message = value
                    .get("error")
                    .or_else(|| value.get("message"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Request failed with status {}", status));
                return JzipError::api_with_data(status, message, Some(value));
            }
        }

        let message = if body.trim().is_empty() {
            format!("Request failed with status {}", status)
        } else {
            body
        };
        JzipError::api(status, message)
    }

    async fn artifact_from_response(response: Response) -> Result<Artifact> {
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_disposition_filename);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?.to_vec();

        Ok(Artifact {
            bytes,
            filename,
            content_type,
        })
    }
}

impl ApiClient for HttpClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn request_json<T, R>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&T>,
    ) -> Result<R>
    where
        T: Serialize + Send + Sync + 'static,
        R: DeserializeOwned + Send + 'static,
    {
        let response = self.builder(method, endpoint, payload).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let response_text = response.text().await?;
        serde_json::from_str::<R>(&response_text)
            .map_err(|_| JzipError::invalid_response(format!("Invalid API response: {}", response_text)))
    }

    async fn request_binary<T>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&T>,
    ) -> Result<Artifact>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let response = self.builder(method, endpoint, payload).send().await?;
        Self::artifact_from_response(response).await
    }

    async fn upload_file(
        &self,
        endpoint: &str,
        file_bytes: Vec<u8>,
        file_name: &str,
        filename_field: Option<&str>,
        options_json: String,
    ) -> Result<Artifact> {
        let url = self.config.endpoint_url(endpoint);
        tracing::debug!("POST {} (multipart, {} bytes)", url, file_bytes.len());

        let part = Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("application/json")?;

        let mut form = Form::new().part("file", part).text("options", options_json);
        if let Some(filename) = filename_field {
            form = form.text("filename", filename.to_string());
        }

        let response = self.client.post(&url).multipart(form).send().await?;
        Self::artifact_from_response(response).await
    }
}

/// Extract the filename from a Content-Disposition header value
fn parse_content_disposition_filename(value: &str) -> Option<String> {
    let marker = "filename=";
    let idx = value.find(marker)?;
    let raw = value[idx + marker.len()..]
        .split(';')
        .next()?
        .trim()
        .trim_matches('"');

    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_disposition_filename() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=\"export.zip\""),
            Some("export.zip".to_string())
        );
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=export.zip"),
            Some("export.zip".to_string())
        );
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=\"a.zip\"; size=3"),
            Some("a.zip".to_string())
        );
        assert_eq!(parse_content_disposition_filename("attachment"), None);
        assert_eq!(parse_content_disposition_filename("filename=\"\""), None);
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig {
            base_url: String::new(),
            ..ClientConfig::default()
        };
        assert!(HttpClient::new(config).is_err());
    }

    #[test]
    fn test_client_builds_with_defaults() {
        let client = HttpClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().timeout, 30);
    }
}
