//! liverstage - Versioned layer storage for liver-stage classifiers
//!
//! Live layer configurations for an LSTM sequence classifier, and a versioned
//! store that persists them as records and reads records written by any
//! earlier release.
//!
//! # Architecture
//!
//! - `layers`: live, validated layer configurations and the `Network` container
//! - `state`: records, upgrade chains per layer kind, encode/decode, archives
//! - `config`: store settings
//! - `cli`: command implementations for `liverstage-cli`

pub mod cli;
pub mod config;
pub mod error;
pub mod layers;
pub mod state;

pub use config::StoreConfig;
pub use error::{LayerStoreError, Result};
pub use layers::{Layer, LayerKind, Network, NetworkLayer};
pub use state::{LayerRecord, NetworkArchive, VersionedLayerStore};
