//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// CPC classification hierarchy builder: release parsing, tree construction, warehouse publishing
#[derive(Parser, Debug)]
#[command(name = "cpcdb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-d: info, -dd: debug, -ddd: trace)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the hierarchy database from a release directory
    Build {
        /// Directory containing the release artifacts (default: cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        source_dir: Option<PathBuf>,

        /// Database output path (default: configured filename in the source directory)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Load the hierarchy table into the analytic warehouse (full replace)
    Publish {
        /// Path to the hierarchy database
        #[arg(value_hint = ValueHint::FilePath)]
        db_path: PathBuf,

        /// Warehouse table as project.dataset.table (default: from config)
        #[arg(short, long)]
        target: Option<String>,

        /// Preview row count and sample rows without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
