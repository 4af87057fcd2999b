//! Readers that turn on-disk artefacts into regions and decoder
//! context.
//!
//! Every reader is stateless with respect to disk: each invocation
//! parses its input whole and hands back owned values.

pub mod dump;
pub mod pspec;
pub mod raw;

pub use self::dump::regions_from_dump;
pub use self::pspec::context_from_pspec;
pub use self::raw::regions_from_file;

use crate::Error;
use std::path::Path;

/// Input files larger than this are rejected (dumps) or truncated (raw
/// images).
pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

pub(crate) fn load_error(path: &Path, err: std::io::Error) -> Error {
    Error::UnableToLoadFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
