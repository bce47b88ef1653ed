use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::extract::Entry;

/// Delimiter for multi-line values written as `KEY<<EBX_EOF`
pub const HEREDOC_DELIMITER: &str = "EBX_EOF";

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum Format {
    /// `KEY=value` lines, heredoc blocks for multi-line values
    Env,
    /// A JSON array of `{"key", "value"}` objects
    Json,
}

#[derive(Debug, Clone)]
pub enum Target {
    Stdout,
    File(PathBuf),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("key {0:?} cannot be written as KEY=value")]
    InvalidKey(String),

    #[error("value of {0:?} contains the heredoc delimiter EBX_EOF")]
    DelimiterCollision(String),

    #[error("failed to serialize entries: {0}")]
    Json(#[from] serde_json::Error),
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_env_line(entry: &Entry, out: &mut String) -> Result<(), OutputError> {
    if entry.key.is_empty() || entry.key.contains('=') || entry.key.contains('\n') {
        return Err(OutputError::InvalidKey(entry.key.clone()));
    }

    let value = value_to_string(&entry.value);
    if value.contains('\n') {
        if value.lines().any(|line| line == HEREDOC_DELIMITER) {
            return Err(OutputError::DelimiterCollision(entry.key.clone()));
        }
        out.push_str(&format!(
            "{}<<{}\n{}\n{}\n",
            entry.key, HEREDOC_DELIMITER, value, HEREDOC_DELIMITER
        ));
    } else {
        out.push_str(&format!("{}={}\n", entry.key, value));
    }

    Ok(())
}

/// Render entries in the requested format
pub fn render_entries(entries: &[Entry], format: Format) -> Result<String, OutputError> {
    match format {
        Format::Env => {
            let mut out = String::new();
            for entry in entries {
                render_env_line(entry, &mut out)?;
            }
            Ok(out)
        }
        Format::Json => {
            let mut out = serde_json::to_string(entries)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Write entries to stdout or append them to a file
pub fn write_entries(entries: &[Entry], format: Format, target: &Target) -> Result<()> {
    let rendered = render_entries(entries, format)?;
    debug!("Rendered output:\n{}", rendered);

    match target {
        Target::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write entries to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
        Target::File(path) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open output file: {}", path.display()))?;
            file.write_all(rendered.as_bytes())
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("Wrote {} entries to {}", entries.len(), path.display());
        }
    }

    Ok(())
}
