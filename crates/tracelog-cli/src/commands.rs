use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tracelog")]
#[command(about = "Bookkeeping for skeleton tracing files", long_about = None)]
pub struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Append the node count and time of one annotation file to a log
    #[command(visible_alias = "appender")]
    Append {
        /// .nml or .xml annotation file
        annotation: PathBuf,
        /// CSV log, created if missing
        log: PathBuf,
    },
    /// Append every annotation file found under a directory
    AppendDir { dir: PathBuf, log: PathBuf },
    /// Attribute tracing files to users from the activity sheet
    Reconcile {
        /// Per-file node table (CSV)
        #[arg(long)]
        files: PathBuf,
        /// User activity sheet (CSV)
        #[arg(long)]
        users: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Compute nodes and time added by each file
    Increments {
        #[arg(long)]
        files: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Export the node tuples of an annotation file as CSV
    Nodes {
        annotation: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Load a cleaned CSV into a new SQLite table
    Load {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        table: String,
        /// Comma-separated type tags: int, real, text, date
        #[arg(long, value_delimiter = ',', required = true)]
        types: Vec<String>,
        /// Comma-separated names for the leading CSV columns
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
        /// Database file; defaults to the configured path
        #[arg(long)]
        db: Option<String>,
        /// Fail instead of dropping an existing table
        #[arg(long)]
        keep_existing: bool,
        /// Stage the load and roll it back
        #[arg(long)]
        dry_run: bool,
    },
    /// Print configuration values
    PrintConfig,
}
