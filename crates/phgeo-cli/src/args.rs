use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for phgeo
#[derive(Debug, Parser)]
#[command(
    name = "phgeo",
    version,
    about = "Load and inspect the Philippine region/province/municipality/barangay fixtures"
)]
pub struct CliArgs {
    /// Directory holding regions.json, provinces.json, municipalities.json
    /// and barangays.json (default: the data/ dir bundled with phgeo-core)
    #[arg(short = 'd', long = "dir", global = true, env = "PHGEO_FIXTURE_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load all fixtures in order; fails on the first broken fixture
    Load,

    /// Show record counts per level
    Stats,

    /// Look up a record by code at any level
    Lookup {
        /// PSGC code (e.g. 137404000)
        code: String,
    },

    /// Search names at every level (accent- and case-insensitive)
    Search {
        /// Substring to search for
        query: String,
    },

    /// Print the SQL of the initial migration
    Migrations,

    /// Write a binary snapshot of the loaded store
    Snapshot {
        /// Output path
        out: PathBuf,
    },
}
