pub mod cli;
pub mod columns;
pub mod config;
pub mod error;
pub mod fetch;
pub mod header;
pub mod io_utils;
pub mod merge;
pub mod normalize;
pub mod record;
pub mod store;
pub mod sync;
pub mod tokenizer;
pub mod vehicle;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use serde_json::json;

use crate::{
    cli::{Cli, Commands},
    config::{SyncConfig, SyncMode},
    fetch::HttpFetcher,
    record::{CSV_HEADERS, parse_sheet},
    store::{JsonFileStore, OrderStore, SettingsStore},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("order_sync", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => handle_sync(&args),
        Commands::Parse(args) => handle_parse(&args),
        Commands::Status(args) => handle_status(&args),
        Commands::Sources(args) => handle_sources(&args),
    }
}

fn handle_sync(args: &cli::SyncArgs) -> Result<()> {
    let config = SyncConfig::load(&args.config)?;
    let mode = if args.all {
        SyncMode::All
    } else {
        SyncMode::Current
    };
    let sources = config.select(mode);
    info!(
        "Starting {:?} sync of {} source(s) into {:?}",
        mode,
        sources.len(),
        args.store
    );
    let fetcher = HttpFetcher::new(&config).context("Building HTTP client")?;
    let mut store = JsonFileStore::open(&args.store)
        .with_context(|| format!("Opening order store {:?}", args.store))?;
    let result = sync::run_sync(&sources, &fetcher, &mut store)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Serializing sync result")?
    );
    Ok(())
}

fn handle_parse(args: &cli::ParseArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let text = io_utils::read_text(&args.input, encoding)?;
    let rows = parse_sheet(&text, args.variant)
        .with_context(|| format!("Parsing sheet {:?}", args.input))?;

    let mut writer = io_utils::open_csv_writer(args.output.as_deref())?;
    writer
        .write_record(CSV_HEADERS)
        .context("Writing output headers")?;
    let mut written = 0usize;
    let mut skipped = 0usize;
    for row in &rows {
        match &row.record {
            Some(record) => {
                writer
                    .write_record(record.csv_fields())
                    .with_context(|| format!("Writing output row for sheet row {}", row.row_number))?;
                written += 1;
            }
            None => skipped += 1,
        }
    }
    writer.flush().context("Flushing output writer")?;

    let destination = args
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(
        "Normalized {} record(s) as {} ({} nameless row(s) skipped) -> {}",
        written, args.variant, skipped, destination
    );
    Ok(())
}

fn handle_status(args: &cli::StatusArgs) -> Result<()> {
    let store = JsonFileStore::open(&args.store)
        .with_context(|| format!("Opening order store {:?}", args.store))?;
    let metadata = store.sync_metadata()?;
    let status = json!({
        "orders": store.count()?,
        "last_sync_time": metadata.as_ref().map(|m| m.last_sync_time),
        "last_sync_count": metadata.as_ref().map(|m| m.last_sync_count),
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn handle_sources(args: &cli::SourcesArgs) -> Result<()> {
    let config = SyncConfig::load(&args.config)?;
    let current = config.current().map(|s| s.label.as_str());
    for source in &config.sources {
        let marker = if Some(source.label.as_str()) == current {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {}\t{}\t{}\t{}",
            source.label, source.variant, source.remote_id, source.tab_id
        );
    }
    Ok(())
}
