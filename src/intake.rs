//! File intake for jzip: expanding user-supplied paths into candidates and
//! partitioning them into accepted and rejected sets

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{JzipError, Result};
use crate::file::CandidateFile;
use crate::validation::{
    validate_file_size, validate_file_type, DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_FILE_SIZE,
};

/// Limits applied to offered files
#[derive(Debug, Clone)]
pub struct IntakeLimits {
    pub allowed_types: Vec<String>,
    pub max_file_size: u64,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_ALLOWED_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// A file turned away during intake, with the reason shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub filename: String,
    pub reason: String,
}

/// Outcome of offering candidates to a selection
#[derive(Debug)]
pub struct IntakeReport {
    pub accepted: Vec<String>,
    pub rejected: Vec<RejectedFile>,
}

/// True when any of the given paths points at a regular file
///
/// Cheap pre-check before scanning, analogous to asking an intake event
/// whether it carries files at all.
pub fn has_files(paths: &[PathBuf]) -> bool {
    paths.iter().any(|p| p.is_file())
}

/// Expand file and directory arguments into candidate files
///
/// Directories contribute their JSON and text files, recursively when asked,
/// in a stable name order so later errors are deterministic. An empty
/// expansion is an error.
pub async fn scan_paths(paths: &[PathBuf], recursive: bool) -> Result<Vec<CandidateFile>> {
    let mut candidates = Vec::new();

    for path in paths {
        if path.is_dir() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(path)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok());

            for entry in walker {
                if entry.file_type().is_file() && has_convertible_extension(entry.path()) {
                    candidates.push(CandidateFile::from_path(entry.path()).await?);
                }
            }
        } else {
            candidates.push(CandidateFile::from_path(path).await?);
        }
    }

    if candidates.is_empty() {
        return Err(JzipError::empty_selection());
    }

    Ok(candidates)
}

fn has_convertible_extension(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("json") | Some("txt")
    )
}

/// Accumulated file selection with accept/reject validation
///
/// `multiple` controls whether a new offer extends the current selection or
/// replaces it with at most one file. Rejected files never block accepted
/// ones; each rejection carries its own reason.
#[derive(Debug)]
pub struct Selection {
    multiple: bool,
    limits: IntakeLimits,
    files: Vec<CandidateFile>,
}

impl Selection {
    pub fn new(multiple: bool, limits: IntakeLimits) -> Self {
        Self {
            multiple,
            limits,
            files: Vec::new(),
        }
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Validate candidates and fold the accepted ones into the selection
    pub fn offer(&mut self, candidates: Vec<CandidateFile>) -> Result<IntakeReport> {
        if candidates.is_empty() {
            return Err(JzipError::empty_selection());
        }

        let allowed: Vec<&str> = self.limits.allowed_types.iter().map(String::as_str).collect();

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for candidate in candidates {
            let verdict = validate_file_type(&candidate, &allowed)
                .and_then(|_| validate_file_size(&candidate, self.limits.max_file_size));

            match verdict {
                Ok(()) => accepted.push(candidate),
                Err(e) => rejected.push(RejectedFile {
                    filename: candidate.name.clone(),
                    reason: e.user_message(),
                }),
            }
        }

        if !self.multiple {
            self.files.clear();
            accepted.truncate(1);
        }

        let report = IntakeReport {
            accepted: accepted.iter().map(|f| f.name.clone()).collect(),
            rejected,
        };
        self.files.extend(accepted);

        Ok(report)
    }
}
