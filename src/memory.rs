//! Named byte regions handed to the lifter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A contiguous, named span of bytes at a region-local base offset.
///
/// A region is a view into an image, not an owner of address space: the
/// loader produces regions with image-local bases and the enclosing
/// `Target` shifts them to their load address when the decoder maps them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemoryRegion {
    name: String,
    base: u64,
    data: Vec<u8>,
}

impl MemoryRegion {
    /// Create a new `MemoryRegion`.
    pub fn new<S: Into<String>>(name: S, base: u64, data: Vec<u8>) -> MemoryRegion {
        MemoryRegion {
            name: name.into(),
            base,
            data,
        }
    }

    /// Get the display name of this region.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the base offset of this region.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Get this region's bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the length of this region in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// True if this region holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if this region holds the byte at `address`.
    ///
    /// An empty region holds nothing, its own base included.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address - self.base < self.len()
    }

    /// True if this region holds all `length` bytes starting at
    /// `address`.
    ///
    /// Callers may pass values up to `u64::MAX`; the checks never wrap.
    /// A zero-length range references no bytes and is never contained.
    pub fn contains_range(&self, address: u64, length: u64) -> bool {
        if length == 0 || address < self.base {
            return false;
        }
        let offset = address - self.base;
        length <= self.len() && offset <= self.len() - length
    }

    /// Clone this region with its base shifted by `offset`.
    pub fn rebase(&self, offset: u64) -> MemoryRegion {
        MemoryRegion {
            name: self.name.clone(),
            base: self.base + offset,
            data: self.data.clone(),
        }
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} [{:#x}, {:#x})",
            self.name,
            self.base,
            self.base + self.len()
        )
    }
}
