//! Store configuration.
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayerStoreError, Result};

/// Settings for decoding records and handling archive files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Reject record fields that are not part of the current schema.
    pub strict_fields: bool,

    /// Verify archive checksums on load.
    pub verify_checksum: bool,

    /// Write archives as indented JSON.
    pub pretty_print: bool,

    /// Keep a `.bak` copy of an archive before upgrading it in place.
    pub backup_on_upgrade: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            strict_fields: false,
            verify_checksum: true,
            pretty_print: true,
            backup_on_upgrade: true,
        }
    }
}

impl StoreConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LayerStoreError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
