//! Region dump loader.
//!
//! A dump is a JSON array of named regions whose payload is an ASCII hex
//! string, most-significant nibble first. The companion extraction
//! script emits one entry per function boundary, but every entry is
//! treated as an opaque region here.

use super::{load_error, MAX_INPUT_BYTES};
use crate::memory::MemoryRegion;
use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct DumpRegion {
    name: String,
    base_address: u64,
    data: String,
}

/// Parse a region dump into its regions.
///
/// Odd-length or non-hex payloads and inputs over 50 MiB fail the whole
/// load.
pub fn regions_from_dump(path: &Path) -> Result<Vec<MemoryRegion>> {
    let metadata = fs::metadata(path).map_err(|e| load_error(path, e))?;
    if metadata.len() > MAX_INPUT_BYTES {
        return Err(Error::UnableToLoadFile {
            path: path.to_path_buf(),
            reason: format!(
                "dump is {} bytes, over the {} byte limit",
                metadata.len(),
                MAX_INPUT_BYTES
            ),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    let entries: Vec<DumpRegion> = serde_json::from_str(&text)?;

    let mut regions = Vec::with_capacity(entries.len());
    for entry in entries {
        let data = hex::decode(&entry.data)?;
        regions.push(MemoryRegion::new(entry.name, entry.base_address, data));
    }
    Ok(regions)
}
