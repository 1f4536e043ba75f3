//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::layers::{LayerKind, Network, NetworkLayer};
use crate::state::{NetworkArchive, UpgradeReport, VersionedLayerStore};

/// Create a new classifier archive.
pub fn init(
    store: &VersionedLayerStore,
    path: &Path,
    features: usize,
    hidden: usize,
    classes: Vec<String>,
    dropout: f64,
) -> Result<()> {
    info!("Creating classifier archive at: {}", path.display());

    let network = Network::liver_stage_classifier(features, hidden, classes, dropout)?;
    let archive = NetworkArchive::save(&network, path, store)?;

    println!("Archive created: {}", path.display());
    println!("Archive id: {}", archive.archive_id);
    println!("Layers: {}", archive.layers.len());

    Ok(())
}

/// Decode an archive and print one line per layer.
pub fn inspect(store: &VersionedLayerStore, path: &Path) -> Result<()> {
    info!("Inspecting archive: {}", path.display());

    let archive = NetworkArchive::read(path)?;
    let versions: Vec<(LayerKind, u32)> = archive
        .layers
        .iter()
        .map(|record| (record.layer_kind, record.schema_version))
        .collect();

    println!("Archive: {}", path.display());
    println!("Id: {}", archive.archive_id);
    println!(
        "Saved: {} (liverstage {})",
        archive.saved_at.format("%Y-%m-%d %H:%M:%S"),
        archive.crate_version
    );
    println!("{:-<72}", "");

    let network = archive.into_network(store)?;
    for (i, (layer, (kind, version))) in network.layers().iter().zip(versions).enumerate() {
        let marker = if version < store.current_version(kind) {
            "*"
        } else {
            " "
        };
        println!(
            "{}{:>2}  {:<14} {:<22} v{}  {}",
            marker,
            i + 1,
            layer.name(),
            layer.type_label(),
            version,
            layer.description()
        );
    }

    println!("{:-<72}", "");
    println!("* stored at an older schema version; run 'liverstage upgrade' to rewrite");

    Ok(())
}

/// Upgrade one archive file, or every archive under a directory.
pub fn upgrade(store: &VersionedLayerStore, path: &Path) -> Result<()> {
    if !path.is_dir() {
        let report = NetworkArchive::upgrade_file(path, store)?;
        print_report(&report);
        return Ok(());
    }

    info!("Upgrading archives under: {}", path.display());
    let archives = NetworkArchive::find_archives(path);
    if archives.is_empty() {
        println!("No archives found under {}", path.display());
        return Ok(());
    }

    let mut failed = 0;
    for archive in &archives {
        match NetworkArchive::upgrade_file(archive, store) {
            Ok(report) => print_report(&report),
            Err(e) => {
                warn!("Skipping {}: {}", archive.display(), e);
                println!("{}: FAILED ({})", archive.display(), e.error_code());
                failed += 1;
            }
        }
    }

    println!("{:-<72}", "");
    println!(
        "Archives: {} | Failed: {}",
        archives.len(),
        failed
    );

    Ok(())
}

fn print_report(report: &UpgradeReport) {
    if report.is_unchanged() {
        println!("{}: up to date", report.path.display());
        return;
    }

    println!("{}: upgraded", report.path.display());
    for upgrade in &report.upgraded {
        println!(
            "  layer {} ({}): v{} -> v{}",
            upgrade.index + 1,
            upgrade.kind,
            upgrade.from,
            upgrade.to
        );
    }
    if let Some(backup) = &report.backup_path {
        println!("  backup: {}", backup.display());
    }
}

/// Print the current schema version of every layer kind.
pub fn versions(store: &VersionedLayerStore) -> Result<()> {
    println!("{:<24} {}", "Layer kind", "Schema version");
    println!("{:-<40}", "");
    for kind in LayerKind::ALL {
        println!("{:<24} {}", kind.label(), store.current_version(kind));
    }
    Ok(())
}
