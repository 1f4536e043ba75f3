//! Network archives.
//!
//! An archive is a JSON file holding the layer records of one network plus a
//! SHA-256 checksum over those records. Loading decodes every record through
//! the versioned store; any failure aborts the whole load.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{LayerStoreError, Result};
use crate::layers::{LayerKind, Network};
use crate::state::record::LayerRecord;
use crate::state::store::VersionedLayerStore;

/// Extension for archive files.
pub const ARCHIVE_EXTENSION: &str = "json";

/// Extension appended to backups written before an in-place upgrade.
pub const BACKUP_EXTENSION: &str = "bak";

/// Crate version written into new archives.
pub const LIVERSTAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// On-disk form of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkArchive {
    /// Stable identifier, kept across upgrades.
    pub archive_id: Uuid,

    /// When the archive was last written.
    pub saved_at: DateTime<Utc>,

    /// liverstage version that last wrote the archive.
    pub crate_version: String,

    /// Hex SHA-256 of the serialized `layers`.
    pub checksum: String,

    /// Layer records in network order.
    pub layers: Vec<LayerRecord>,
}

/// One record brought forward by [`NetworkArchive::upgrade_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpgrade {
    pub index: usize,
    pub kind: LayerKind,
    pub from: u32,
    pub to: u32,
}

/// Outcome of upgrading one archive file.
#[derive(Debug, Clone)]
pub struct UpgradeReport {
    pub path: PathBuf,
    pub upgraded: Vec<RecordUpgrade>,
    /// Copy of the original file, if one was written.
    pub backup_path: Option<PathBuf>,
}

impl UpgradeReport {
    /// True if the file was already current and left untouched.
    pub fn is_unchanged(&self) -> bool {
        self.upgraded.is_empty()
    }
}

impl NetworkArchive {
    /// Encode every layer of a network.
    pub fn from_network(network: &Network, store: &VersionedLayerStore) -> Result<Self> {
        let layers: Vec<LayerRecord> = network
            .layers()
            .iter()
            .map(|layer| store.encode(layer))
            .collect();
        Ok(Self {
            archive_id: Uuid::new_v4(),
            saved_at: Utc::now(),
            crate_version: LIVERSTAGE_VERSION.to_string(),
            checksum: Self::compute_checksum(&layers)?,
            layers,
        })
    }

    /// SHA-256 over the compact JSON of the records.
    pub fn compute_checksum(layers: &[LayerRecord]) -> Result<String> {
        let bytes = serde_json::to_vec(layers)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }

    pub fn verify_checksum(&self) -> Result<()> {
        let actual = Self::compute_checksum(&self.layers)?;
        if actual != self.checksum {
            return Err(LayerStoreError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Decode every record into a network. All-or-nothing.
    pub fn into_network(self, store: &VersionedLayerStore) -> Result<Network> {
        if store.config().verify_checksum {
            self.verify_checksum()?;
        }
        let layers = self
            .layers
            .into_iter()
            .map(|record| store.decode(record))
            .collect::<Result<Vec<_>>>()?;
        Network::from_layers(layers)
    }

    /// Read and parse an archive file without decoding it.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LayerStoreError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let archive = serde_json::from_str(&content).map_err(|e| LayerStoreError::MalformedRecord {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(archive)
    }

    pub fn write(&self, path: &Path, pretty: bool) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LayerStoreError::DirectoryCreateError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let content = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        fs::write(path, content).map_err(|e| LayerStoreError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Encode a network and write it to `path`.
    pub fn save(network: &Network, path: &Path, store: &VersionedLayerStore) -> Result<Self> {
        let archive = Self::from_network(network, store)?;
        archive.write(path, store.config().pretty_print)?;
        info!(
            "Saved {} layers to {} (archive {})",
            archive.layers.len(),
            path.display(),
            archive.archive_id
        );
        Ok(archive)
    }

    /// Read, verify and decode the archive at `path`.
    pub fn load(path: &Path, store: &VersionedLayerStore) -> Result<Network> {
        let network = Self::read(path)?.into_network(store)?;
        info!("Loaded {} layers from {}", network.len(), path.display());
        Ok(network)
    }

    /// Rewrite an archive with every record at its current schema version.
    ///
    /// Every upgraded record is also decoded, so a file is only rewritten if
    /// the whole network is readable. Files that are already current are left
    /// untouched.
    pub fn upgrade_file(path: &Path, store: &VersionedLayerStore) -> Result<UpgradeReport> {
        let mut archive = Self::read(path)?;
        if store.config().verify_checksum {
            archive.verify_checksum()?;
        }

        let mut upgraded = Vec::new();
        let mut layers = Vec::with_capacity(archive.layers.len());
        for (index, record) in archive.layers.into_iter().enumerate() {
            let kind = record.layer_kind;
            let from = record.schema_version;
            let record = store.upgrade(record)?;
            store.decode(record.clone())?;
            if record.schema_version != from {
                upgraded.push(RecordUpgrade {
                    index,
                    kind,
                    from,
                    to: record.schema_version,
                });
            }
            layers.push(record);
        }

        let mut report = UpgradeReport {
            path: path.to_path_buf(),
            upgraded,
            backup_path: None,
        };
        if report.is_unchanged() {
            info!("{} is already current", path.display());
            return Ok(report);
        }

        if store.config().backup_on_upgrade {
            let backup = backup_path(path);
            fs::copy(path, &backup).map_err(|e| LayerStoreError::FileWriteError {
                path: backup.clone(),
                source: e,
            })?;
            report.backup_path = Some(backup);
        }

        archive.checksum = Self::compute_checksum(&layers)?;
        archive.layers = layers;
        archive.saved_at = Utc::now();
        archive.crate_version = LIVERSTAGE_VERSION.to_string();
        archive.write(path, store.config().pretty_print)?;

        info!(
            "Upgraded {} records in {}",
            report.upgraded.len(),
            path.display()
        );
        Ok(report)
    }

    /// Find archive files under `dir`, sorted by path.
    pub fn find_archives(dir: &Path) -> Vec<PathBuf> {
        let mut archives: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .map_or(false, |ext| ext == ARCHIVE_EXTENSION)
            })
            .map(|entry| entry.path().to_path_buf())
            .collect();
        archives.sort();
        archives
    }
}

/// `model.json` -> `model.json.bak`
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}
