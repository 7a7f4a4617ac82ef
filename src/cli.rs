use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::columns::SchemaVariant;

#[derive(Debug, Parser)]
#[command(author, version, about = "Sync community order spreadsheets into the order store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch configured sheets and merge their rows into the order store
    Sync(SyncArgs),
    /// Normalize a locally saved sheet export and write the records as CSV
    Parse(ParseArgs),
    /// Show the last sync metadata and the number of stored orders
    Status(StatusArgs),
    /// List the configured sheet sources
    Sources(SourcesArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Source configuration file (YAML)
    #[arg(short, long, default_value = "order-sync.yaml")]
    pub config: PathBuf,
    /// JSON order store file
    #[arg(short, long, default_value = "orders.json")]
    pub store: PathBuf,
    /// Sync every configured source instead of only the current one
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Sheet export (CSV) to normalize
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Column layout of the sheet
    #[arg(long, value_enum)]
    pub variant: SchemaVariant,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// JSON order store file
    #[arg(short, long, default_value = "orders.json")]
    pub store: PathBuf,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Source configuration file (YAML)
    #[arg(short, long, default_value = "order-sync.yaml")]
    pub config: PathBuf,
}
