//! Conversion options shared by every conversion endpoint

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Compression algorithm applied to archive entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compression {
    /// DEFLATE compression (the service default)
    #[default]
    #[serde(rename = "DEFLATE")]
    Deflate,
    /// Store entries uncompressed
    #[serde(rename = "STORE")]
    Store,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Deflate => "DEFLATE",
            Compression::Store => "STORE",
        }
    }
}

/// Naming strategy for entries inside the generated archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileNaming {
    #[default]
    Auto,
    Original,
    Timestamp,
}

impl FileNaming {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileNaming::Auto => "auto",
            FileNaming::Original => "original",
            FileNaming::Timestamp => "timestamp",
        }
    }
}

/// Options forwarded verbatim to the conversion service
///
/// The shape is fixed; unknown keys are rejected rather than silently
/// dropped. Values are not interpreted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ConvertOptions {
    pub compression: Compression,
    #[validate(range(min = 0, max = 9))]
    pub compression_level: u8,
    pub create_folders: bool,
    pub create_separate_files: bool,
    pub file_naming: FileNaming,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflate,
            compression_level: 6,
            create_folders: false,
            create_separate_files: false,
            file_naming: FileNaming::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert_eq!(options.compression, Compression::Deflate);
        assert_eq!(options.compression_level, 6);
        assert!(!options.create_folders);
        assert!(!options.create_separate_files);
        assert_eq!(options.file_naming, FileNaming::Auto);
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let json = serde_json::to_value(ConvertOptions::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["compression"], "DEFLATE");
        assert_eq!(object["compressionLevel"], 6);
        assert!(object.contains_key("createFolders"));
        assert!(object.contains_key("createSeparateFiles"));
        assert_eq!(object["fileNaming"], "auto");
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let options: ConvertOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ConvertOptions::default());

        let options: ConvertOptions =
            serde_json::from_str(r#"{"compression":"STORE"}"#).unwrap();
        assert_eq!(options.compression, Compression::Store);
        assert_eq!(options.compression_level, 6);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = serde_json::from_str::<ConvertOptions>(r#"{"password":"hunter2"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_level_range_validated() {
        use validator::Validate;

        let mut options = ConvertOptions::default();
        assert!(options.validate().is_ok());

        options.compression_level = 12;
        assert!(options.validate().is_err());
    }
}
