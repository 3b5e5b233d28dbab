//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Resolve, download and load datasets from an open-data portal.
///
/// References are dataset slugs (`padron-nominal`) or full detail-page URLs.
#[derive(Parser, Debug)]
#[command(name = "datos")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Portal origin (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a dataset reference and print its record as JSON
    Resolve(ResolveArgs),
    /// Download every resource of a dataset plus its record side-car
    Download(DownloadArgs),
    /// Print the data dictionary of a dataset
    Dictionary(DictionaryArgs),
    /// Load a local tabular file and print a preview
    Load(LoadArgs),
    /// List and resolve datasets under a topic
    Search(SearchArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ResolveArgs {
    /// Dataset slug or portal URL
    pub reference: String,

    /// Save the record side-car under the destination root
    #[arg(long)]
    pub save: bool,

    /// Destination root for --save
    #[arg(short, long)]
    pub dest: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct DownloadArgs {
    /// Dataset slug or portal URL
    pub reference: String,

    /// Destination root (default: datasets)
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Skip resources larger than this many bytes (negative for unlimited)
    #[arg(long, allow_negative_numbers = true)]
    pub max_size: Option<i64>,

    /// Re-download resources that already exist on disk
    #[arg(long)]
    pub no_skip_existing: bool,

    /// Do not verify TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Per-request timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Pause after each download in milliseconds (0-60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_ms: Option<u64>,
}

#[derive(ClapArgs, Debug)]
pub struct DictionaryArgs {
    /// Dataset slug or portal URL
    pub reference: String,
}

#[derive(ClapArgs, Debug)]
pub struct LoadArgs {
    /// Path of the file to load
    pub path: PathBuf,

    /// Format to use instead of the file suffix (csv, xlsx, json, parquet, ...)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Number of rows to print
    #[arg(short = 'n', long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(ClapArgs, Debug)]
pub struct SearchArgs {
    /// Topic constant name (SALUD) or slug (salud-27)
    pub category: String,

    /// Stop after this many datasets
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Save every record side-car under the destination root
    #[arg(long)]
    pub save: bool,

    /// Destination root for --save
    #[arg(short, long)]
    pub dest: Option<PathBuf>,
}
