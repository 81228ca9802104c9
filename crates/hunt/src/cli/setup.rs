use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hunt",
    bin_name = "hunt",
    version,
    disable_help_subcommand = true,
    about = "Crash-safe encounter counter",
    long_about = None,
    after_help = "Hunts are selected by ID or by their position in `hunt list` (1 = most recently updated)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (overrides HUNT_DATA_DIR and the config file)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Config file to use instead of the default hunt.toml
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Hunt name
    pub name: String,

    /// Target species
    #[arg(long, short = 't')]
    pub target: String,

    #[arg(long, default_value = "")]
    pub game: String,

    #[arg(long, default_value = "")]
    pub method: String,

    /// Odds denominator, as in 1 in N
    #[arg(long, default_value_t = 4096, value_name = "N")]
    pub odds: u64,

    #[arg(long)]
    pub charm: bool,

    #[arg(long)]
    pub masuda: bool,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new hunt
    #[command(alias = "n", display_order = 1)]
    Create(CreateArgs),

    /// List hunts, most recently updated first
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Include archived hunts
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one hunt with its phases
    #[command(alias = "v", display_order = 3)]
    Show { hunt: String },

    /// Count encounters
    #[command(alias = "i", display_order = 10)]
    Inc {
        hunt: String,
        /// How many encounters (each is its own commit)
        #[arg(short = 'n', long, default_value_t = 1)]
        times: u32,
    },

    /// Undo one encounter (never goes below zero)
    #[command(alias = "d", display_order = 11)]
    Dec { hunt: String },

    /// Set the counter directly
    #[command(display_order = 12)]
    Set {
        hunt: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Record a phase at the current count
    #[command(display_order = 13)]
    Phase {
        hunt: String,
        species: String,
        /// The phase is the target species
        #[arg(long)]
        target: bool,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a phase by ID or position
    #[command(display_order = 14)]
    Unphase { hunt: String, phase: String },

    /// Rename a hunt
    #[command(display_order = 20)]
    Rename { hunt: String, name: String },

    /// Archive (or unarchive) a hunt
    #[command(display_order = 21)]
    Archive {
        hunt: String,
        #[arg(long)]
        undo: bool,
    },

    /// Delete a hunt (its snapshots are kept)
    #[command(alias = "rm", display_order = 22)]
    Delete { hunt: String },

    /// Check the structure of every record (read-only)
    #[command(display_order = 30)]
    Check,

    /// Scan records and recover corrupted ones
    #[command(display_order = 31)]
    Doctor,

    /// Copy every record into emergency-backups/
    #[command(display_order = 32)]
    Backup,

    /// Write all hunts to a JSON file
    #[command(display_order = 33)]
    Export { file: PathBuf },

    /// Load hunts from a JSON file written by export
    #[command(display_order = 34)]
    Import { file: PathBuf },

    /// Set the folder for overlay text files
    #[command(display_order = 40)]
    Mirror {
        folder: Option<PathBuf>,
        /// Stop writing text files
        #[arg(long, conflicts_with = "folder")]
        off: bool,
    },

    /// Print the data directory
    #[command(display_order = 41)]
    Path,
}
