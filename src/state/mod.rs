//! State Module
//!
//! Versioned persistence of layers: records, the per-kind upgrade registry,
//! encode/decode per layer kind, and network archives.

pub mod archive;
pub mod migration;
pub mod record;
pub mod schema;
pub mod store;

pub use archive::{NetworkArchive, RecordUpgrade, UpgradeReport};
pub use migration::{current_version, KindSchema, UpgradeFn};
pub use record::{ArrayRecord, LayerRecord};
pub use store::VersionedLayerStore;
