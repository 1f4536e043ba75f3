//! liverstage CLI
//!
//! Create, inspect and upgrade liver-stage classifier archives.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use liverstage::cli::{commands, Cli, Commands};
use liverstage::{StoreConfig, VersionedLayerStore};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("liverstage v{}", env!("CARGO_PKG_VERSION"));

    let config = StoreConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load store configuration")?;
    let store = VersionedLayerStore::with_config(config);

    match cli.command {
        Some(cmd) => handle_command(&store, cmd),
        None => {
            println!("liverstage v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(store: &VersionedLayerStore, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            path,
            features,
            hidden,
            classes,
            dropout,
        } => commands::init(store, &path, features, hidden, classes, dropout)
            .with_context(|| format!("Failed to create {}", path.display())),
        Commands::Inspect { path } => commands::inspect(store, &path)
            .with_context(|| format!("Failed to inspect {}", path.display())),
        Commands::Upgrade { path } => commands::upgrade(store, &path)
            .with_context(|| format!("Failed to upgrade {}", path.display())),
        Commands::Versions => commands::versions(store).context("Failed to list versions"),
    }
}
