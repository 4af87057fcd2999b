//! Processor-spec context extraction.
//!
//! Only `context_data/context_set/set` elements are consumed; the rest
//! of the document belongs to the decoder.

use super::load_error;
use crate::{Error, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// Pull `(name, value)` context defaults out of a `.pspec` document.
///
/// Sets missing a `name` or `val` attribute are skipped. A `val` that
/// does not parse as decimal defaults to 0 with a warning. Names are
/// forwarded as-is; the decoder is the authority on which keys exist.
pub fn context_from_pspec(path: &Path) -> Result<Vec<(String, u64)>> {
    let text = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    let document = roxmltree::Document::parse(&text)?;
    if !document.root_element().has_tag_name("processor_spec") {
        return Err(Error::InvalidPspec(path.to_path_buf()));
    }

    let mut pairs = Vec::new();
    for context_data in document
        .root_element()
        .children()
        .filter(|node| node.has_tag_name("context_data"))
    {
        for context_set in context_data
            .children()
            .filter(|node| node.has_tag_name("context_set"))
        {
            for set in context_set
                .children()
                .filter(|node| node.has_tag_name("set"))
            {
                let name = match set.attribute("name") {
                    Some(name) => name,
                    None => continue,
                };
                let val = match set.attribute("val") {
                    Some(val) => val,
                    None => continue,
                };
                let value = val.parse::<u64>().unwrap_or_else(|_| {
                    warn!(
                        "context variable {:?} has non-numeric value {:?}; defaulting to 0",
                        name, val
                    );
                    0
                });
                pairs.push((name.to_string(), value));
            }
        }
    }
    Ok(pairs)
}
