//! Candidate file records, asynchronous readers, and artifact persistence

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::client::Artifact;
use crate::error::{JzipError, Result};
use crate::utils::{get_file_extension, sha256_hex};

/// A file offered for conversion
///
/// The declared content type is derived from the extension, never sniffed
/// from content.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub content_type: String,
}

impl CandidateFile {
    /// Build a candidate by stat'ing a path
    pub async fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() || !path.is_file() {
            return Err(JzipError::file_not_found(path.display().to_string()));
        }

        let metadata = fs::metadata(path).await?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            content_type: content_type_for(&name),
            name,
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    pub fn formatted_size(&self) -> String {
        crate::utils::format_file_size(self.size)
    }
}

/// Declared content type for a filename, from its extension
pub fn content_type_for(name: &str) -> String {
    match get_file_extension(name).to_lowercase().as_str() {
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Read a candidate file as UTF-8 text
///
/// Resolves exactly once with the decoded content or the mapped read error.
pub async fn read_file_as_text(file: &CandidateFile) -> Result<String> {
    fs::read_to_string(&file.path)
        .await
        .map_err(|e| JzipError::io_from_error(format!("Reading '{}'", file.name), e))
}

/// Read a candidate file as raw bytes
pub async fn read_file_as_bytes(file: &CandidateFile) -> Result<Vec<u8>> {
    fs::read(&file.path)
        .await
        .map_err(|e| JzipError::io_from_error(format!("Reading '{}'", file.name), e))
}

/// Write a downloaded artifact to disk
///
/// The native counterpart of an object-URL download. Existing files are not
/// overwritten unless `force` is set; on an attended terminal the user is
/// asked instead of being refused outright.
pub async fn save_artifact(artifact: &Artifact, path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        if console::user_attended() {
            let overwrite = dialoguer::Confirm::new()
                .with_prompt(format!("'{}' exists, overwrite?", path.display()))
                .default(false)
                .interact()?;
            if !overwrite {
                return Err(JzipError::user_cancelled());
            }
        } else {
            return Err(JzipError::file_already_exists(path.display().to_string()));
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| JzipError::io_from_error("Creating output directory", e))?;
        }
    }

    fs::write(path, &artifact.bytes)
        .await
        .map_err(|e| JzipError::io_from_error(format!("Writing '{}'", path.display()), e))?;

    Ok(path.to_path_buf())
}

/// SHA256 checksum of an artifact's bytes, hex encoded
pub fn artifact_checksum(artifact: &Artifact) -> String {
    sha256_hex(&artifact.bytes)
}
