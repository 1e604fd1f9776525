//! Test utilities and helpers for unit tests
//!
//! This module provides common testing utilities including:
//! - Temp directory and fixture file helpers
//! - Candidate and artifact builders

#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::client::Artifact;
    use crate::file::CandidateFile;

    /// Create a temporary directory for testing
    pub fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    /// Create a temporary file with content
    pub fn create_temp_file_with_content(dir: &TempDir, filename: &str, content: &[u8]) -> PathBuf {
        let file_path = dir.path().join(filename);
        std::fs::write(&file_path, content).expect("Failed to write temp file");
        file_path
    }

    /// Create a candidate file backed by a real fixture on disk
    pub async fn candidate_with_content(
        dir: &TempDir,
        filename: &str,
        content: &[u8],
    ) -> CandidateFile {
        let path = create_temp_file_with_content(dir, filename, content);
        CandidateFile::from_path(&path)
            .await
            .expect("Failed to build candidate")
    }

    /// Build an artifact the way a successful conversion response would
    pub fn zip_artifact(bytes: &[u8]) -> Artifact {
        Artifact {
            bytes: bytes.to_vec(),
            filename: None,
            content_type: Some("application/zip".to_string()),
        }
    }
}
