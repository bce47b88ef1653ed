use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use serde_json::Value;
use thiserror::Error;

use crate::utils::{extract_yaml_key, find_duplicate_entries};

/// A single key/value pair taken from the JSON source or the environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

impl Entry {
    /// Empty strings and `null` count as empty
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub sort: bool,
    pub fail_on_empty: bool,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self {
            sort: false,
            fail_on_empty: false,
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid JSON input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("JSON input must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("entry {key:?} has an empty value")]
    EmptyValue { key: String },
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_json_entries(json_text: &str) -> Result<Vec<Entry>, ExtractError> {
    match serde_json::from_str::<Value>(json_text)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| Entry { key, value })
            .collect()),
        other => Err(ExtractError::NotAnObject(kind_of(&other))),
    }
}

fn collect_env_entries<I, K, V>(env: I) -> Vec<Entry>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (name, value) in env {
        let name = name.as_ref();
        let Some(key) = extract_yaml_key(name) else {
            continue;
        };

        if key.is_empty() {
            debug!("Skipping {}: no key after marker", name);
            continue;
        }

        // First variable in snapshot order owns the key
        if !seen.insert(key.to_string()) {
            debug!("Skipping {}: key {:?} already taken", name, key);
            continue;
        }

        entries.push(Entry {
            key: key.to_string(),
            value: Value::String(value.into()),
        });
    }

    entries
}

/// Merge the JSON object in `json_text` with the `INPUT_EBX_` variables of `env`
///
/// JSON entries come first and win on key collisions. With `options.sort` the
/// result is ordered by key. With `options.fail_on_empty` a single empty or
/// `null` value fails the whole batch.
pub fn try_extract_entries<I, K, V>(
    json_text: &str,
    env: I,
    options: &ExtractOptions,
) -> Result<Vec<Entry>, ExtractError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    debug!("Extract options: {:?}", options);

    let json_entries = parse_json_entries(json_text)?;
    debug!("Parsed {} entries from JSON", json_entries.len());

    let mut env_entries = collect_env_entries(env);
    debug!("Found {} entries in environment", env_entries.len());

    let duplicate_keys: Vec<String> = find_duplicate_entries(&json_entries, &env_entries)
        .into_iter()
        .map(|entry| entry.key.clone())
        .collect();

    if !duplicate_keys.is_empty() {
        info!("Dropping environment entries shadowed by JSON: {:?}", duplicate_keys);
        env_entries.retain(|entry| !duplicate_keys.contains(&entry.key));
    }

    let mut entries = json_entries;
    entries.extend(env_entries);

    if options.sort {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
    }

    if options.fail_on_empty {
        if let Some(entry) = entries.iter().find(|entry| entry.is_empty()) {
            return Err(ExtractError::EmptyValue {
                key: entry.key.clone(),
            });
        }
    }

    Ok(entries)
}

/// Same as [`try_extract_entries`], but any failure yields an empty list
pub fn extract_entries<I, K, V>(json_text: &str, env: I, options: &ExtractOptions) -> Vec<Entry>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    match try_extract_entries(json_text, env, options) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Discarding all entries: {}", err);
            Vec::new()
        }
    }
}
