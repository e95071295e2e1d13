//! Optional YAML configuration for the command line.
//!
//! ```yaml
//! reader:
//!   delimiter: ";"
//!   encoding: windows-1252
//! upload:
//!   account_number: "1001"
//!   carrier: usps
//! ```
//!
//! Command-line flags take precedence over anything set here.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{domain::BillUploadDetails, reader::CsvReaderConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    #[serde(default)]
    pub reader: CsvReaderConfig,
    #[serde(default)]
    pub upload: Option<BillUploadDetails>,
}

impl IngestConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reader_and_upload_sections() {
        let config = IngestConfig::from_yaml(
            "reader:\n  delimiter: \";\"\n  encoding: latin1\nupload:\n  account_number: \"1001\"\n",
        )
        .unwrap();
        assert_eq!(config.reader.delimiter, Some(';'));
        assert_eq!(config.reader.encoding.as_deref(), Some("latin1"));
        assert_eq!(config.upload.unwrap().account_number, "1001");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = IngestConfig::from_yaml("reader: {}\n").unwrap();
        assert_eq!(config.reader.delimiter, None);
        assert!(config.upload.is_none());
        assert_eq!(IngestConfig::from_yaml("").unwrap(), IngestConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(IngestConfig::from_yaml("chunk: 10\n").is_err());
    }
}
