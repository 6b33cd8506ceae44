use prefixagg::{PrefixAggregator, Result};
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  CLI Utilities
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Gather Include/Exclude Prefix Lists
--------------------------------------------------------------------------------------*/

/// Collect prefixes from an optional file and an optional inline
/// comma-separated list. File entries come first; the two sources are
/// concatenated.
pub fn gather_prefix_list(file: &Option<PathBuf>, inline: &Option<String>) -> Result<Vec<String>> {
    let mut prefixes = Vec::new();

    if let Some(path) = file {
        prefixes.extend(read_prefixes_from_file(path)?);
    }

    if let Some(list) = inline {
        prefixes.extend(
            list.split(',')
                .map(|prefix| prefix.trim().to_string())
                .filter(|prefix| !prefix.is_empty()),
        );
    }

    Ok(prefixes)
}

/// Read a prefix list file through a scratch aggregator so the file gets
/// the same tolerant line handling as the primary input.
fn read_prefixes_from_file(path: &PathBuf) -> Result<Vec<String>> {
    let scratch = PrefixAggregator::new();
    scratch.add_from_file(path)?;
    Ok(scratch.get_prefixes())
}

/*--------------------------------------------------------------------------------------
  Byte Formatting
--------------------------------------------------------------------------------------*/

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

pub fn format_bytes(bytes: u64) -> String {
    match bytes {
        _ if bytes >= GB => format!("{:.2} GB", bytes as f64 / GB as f64),
        _ if bytes >= MB => format!("{:.2} MB", bytes as f64 / MB as f64),
        _ if bytes >= KB => format!("{:.2} KB", bytes as f64 / KB as f64),
        _ => format!("{bytes} B"),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
