use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ebx::output::{self, Format, Target};
use ebx::{try_extract_entries, ExtractOptions};
use log::{debug, error, info};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Collect entries from a JSON object and INPUT_EBX_* environment variables
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Error)]
    log_level: LogLevel,

    /// JSON object with the entries to emit
    #[arg(long, env = "EBX_JSON", value_name = "TEXT", conflicts_with = "json_file")]
    json: Option<String>,

    /// Read the JSON object from this file instead of --json
    #[arg(long, value_name = "PATH")]
    json_file: Option<PathBuf>,

    /// Sort entries by key
    #[arg(long, env = "EBX_SORT")]
    sort: bool,

    /// Fail when any entry has an empty or null value
    #[arg(long, env = "EBX_FAIL_ON_EMPTY")]
    fail_on_empty: bool,

    /// Append entries to this file instead of printing them
    #[arg(long, env = "EBX_OUTPUT", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Env)]
    format: Format,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn read_json_source(cli: &Cli) -> Result<String> {
    if let Some(path) = &cli.json_file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON file: {}", path.display()));
    }

    Ok(cli.json.clone().unwrap_or_else(|| String::from("{}")))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.to_filter())
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    debug!("CLI arguments: {:#?}", cli);

    let json_text = read_json_source(&cli)?;

    let mut options = ExtractOptions::new();
    options.sort = cli.sort;
    options.fail_on_empty = cli.fail_on_empty;

    // Snapshot the process environment once; the extractor never reads it directly
    let env_snapshot: Vec<(String, String)> = env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect();

    let entries = match try_extract_entries(&json_text, env_snapshot, &options) {
        Ok(entries) => entries,
        Err(err) => {
            error!("Failed to extract entries: {}", err);
            process::exit(1);
        }
    };

    info!("Extracted {} entries", entries.len());

    let target = match cli.output {
        Some(path) => Target::File(path),
        None => Target::Stdout,
    };

    output::write_entries(&entries, cli.format, &target)?;

    Ok(())
}
