//! CLI Module
//!
//! Command-line interface for creating, inspecting and upgrading network
//! archives.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// liverstage - versioned layer storage for liver-stage classifiers
#[derive(Parser, Debug)]
#[command(name = "liverstage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a new liver-stage classifier archive
    #[command(name = "init")]
    Init {
        /// Path for the new archive
        path: PathBuf,

        /// Number of features per time step
        #[arg(long)]
        features: usize,

        /// Number of LSTM hidden units
        #[arg(long, default_value_t = 100)]
        hidden: usize,

        /// Class names, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        classes: Vec<String>,

        /// Dropout probability
        #[arg(long, default_value_t = 0.2)]
        dropout: f64,
    },

    /// Decode an archive and print its layers
    #[command(name = "inspect")]
    Inspect {
        /// Path to the archive
        path: PathBuf,
    },

    /// Upgrade an archive, or every archive under a directory, in place
    #[command(name = "upgrade")]
    Upgrade {
        /// Archive file or directory
        path: PathBuf,
    },

    /// Print the current schema version of every layer kind
    #[command(name = "versions")]
    Versions,
}
