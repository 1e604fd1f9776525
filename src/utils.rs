//! Filename and formatting utilities for jzip clients

use chrono::Utc;
use sha2::{Digest, Sha256};

pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;

/// Sanitize a filename for safe local and archive use
///
/// Characters outside `[a-zA-Z0-9.-]` become underscores, runs of
/// underscores collapse to one, and underscores are trimmed from the
/// edges of every dot-separated segment.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    replaced
        .split('.')
        .map(|segment| {
            let mut cleaned = String::with_capacity(segment.len());
            for c in segment.chars() {
                if c == '_' && cleaned.ends_with('_') {
                    continue;
                }
                cleaned.push(c);
            }
            cleaned.trim_matches('_').to_string()
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Build a timestamped filename from a base name and extension
///
/// The timestamp is ISO-8601-derived UTC with colons and fractional
/// seconds stripped, so the result is valid on every filesystem.
pub fn generate_filename(base: &str, ext: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%dT%H%M%SZ");
    format!("{}_{}.{}", base, timestamp, ext)
}

/// Last-dot-delimited extension of a filename; empty when there is none
pub fn get_file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

/// Filename with its last-dot-delimited extension removed; unchanged when
/// there is none
pub fn remove_file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Format a byte count into a human readable string
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// SHA256 hash of a byte slice, hex encoded
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
