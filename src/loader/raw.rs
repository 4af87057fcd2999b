//! Raw image loader.

use super::{load_error, MAX_INPUT_BYTES};
use crate::memory::MemoryRegion;
use crate::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Wrap a raw binary image as a single region based at 0, named after
/// its path.
///
/// At most 50 MiB are read; the tail of a longer file is ignored.
pub fn regions_from_file(path: &Path) -> Result<Vec<MemoryRegion>> {
    let file = File::open(path).map_err(|e| load_error(path, e))?;
    let mut data = Vec::new();
    file.take(MAX_INPUT_BYTES)
        .read_to_end(&mut data)
        .map_err(|e| load_error(path, e))?;
    Ok(vec![MemoryRegion::new(path.to_string_lossy(), 0, data)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn raw_files_become_one_region_at_zero() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xc3, 0x90, 0x90]).unwrap();

        let regions = regions_from_file(file.path()).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].base(), 0);
        assert_eq!(regions[0].data(), &[0xc3, 0x90, 0x90]);
        assert_eq!(regions[0].name(), file.path().to_string_lossy());
    }

    #[test]
    fn missing_files_fail_to_load() {
        match regions_from_file(Path::new("/nonexistent/image.bin")) {
            Err(Error::UnableToLoadFile { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/image.bin"));
            }
            other => panic!("expected UnableToLoadFile, got {:?}", other),
        }
    }
}
