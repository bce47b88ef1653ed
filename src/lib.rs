//! Merge a JSON object and `INPUT_EBX_` prefixed environment variables into
//! a flat list of key/value entries.

pub mod extract;
pub mod output;
pub mod utils;

pub use extract::{extract_entries, try_extract_entries, Entry, ExtractError, ExtractOptions};
pub use utils::{extract_yaml_key, find_duplicate_entries};
