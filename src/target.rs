//! The input target: an ordered collection of memory regions plus the
//! decoder configuration needed to lift them.

use crate::memory::MemoryRegion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_ALIGNMENT: u64 = 2;

/// One image to lift: regions, a chosen load address, and the processor
/// spec that decodes them.
///
/// Regions are stored with their region-local bases; the load base is
/// applied when the decoder maps them and when addresses are queried.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Target {
    base_address: u64,
    size: u64,
    alignment: u64,
    regions: Vec<MemoryRegion>,
    context: Vec<(String, u64)>,
    spec_path: Option<PathBuf>,
}

impl Target {
    /// Create a target over an ordered list of regions.
    ///
    /// The span covers the lowest region base through the end of the
    /// highest region.
    pub fn from_regions(regions: Vec<MemoryRegion>) -> Target {
        let low = regions.iter().map(|r| r.base()).min().unwrap_or(0);
        let high = regions.iter().map(|r| r.base() + r.len()).max().unwrap_or(0);
        Target {
            base_address: 0,
            size: high - low,
            alignment: DEFAULT_ALIGNMENT,
            regions,
            context: Vec::new(),
            spec_path: None,
        }
    }

    /// Get the load base address.
    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    /// Set the load base address.
    pub fn set_base_address(&mut self, base_address: u64) {
        self.base_address = base_address;
    }

    /// Get the total span of this target in bytes, gaps included.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the instruction alignment used to skip undecodable bytes.
    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// Set the instruction alignment. An alignment of 0 would stall the
    /// address walk, so it is clamped to 1.
    pub fn set_alignment(&mut self, alignment: u64) {
        self.alignment = alignment.max(1);
    }

    /// Get the regions of this target, with their region-local bases.
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    /// Get the context pairs forwarded to the decoder.
    pub fn context(&self) -> &[(String, u64)] {
        &self.context
    }

    /// Set the context pairs forwarded to the decoder.
    pub fn set_context(&mut self, context: Vec<(String, u64)>) {
        self.context = context;
    }

    /// Get the path of the compiled SLEIGH spec for this target.
    pub fn spec_path(&self) -> Option<&Path> {
        self.spec_path.as_deref()
    }

    /// Set the path of the compiled SLEIGH spec for this target.
    pub fn set_spec_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.spec_path = Some(path.into());
    }

    /// Clone the regions with their bases shifted by the load base, the
    /// shape the decoder maps.
    pub fn regions_rebased(&self) -> Vec<MemoryRegion> {
        self.regions
            .iter()
            .map(|region| region.rebase(self.base_address))
            .collect()
    }

    /// Find the region holding the (rebased) `address`, if any.
    ///
    /// Addresses below the load base belong to no region.
    pub fn owning_region(&self, address: u64) -> Option<&MemoryRegion> {
        let local = address.checked_sub(self.base_address)?;
        self.regions.iter().find(|region| region.contains(local))
    }

    /// One past the highest address this target spans.
    pub fn max_address(&self) -> u64 {
        self.base_address + self.size
    }

    /// The next address worth lifting at, on or after `address`.
    ///
    /// Returns `address` itself when a region holds it, otherwise the
    /// start of the nearest region above it, otherwise `None`. Clients
    /// walk a sparse image by calling this with a cursor and advancing
    /// the cursor by each decoded instruction's size.
    pub fn next_address(&self, address: u64) -> Option<u64> {
        if address > self.max_address() {
            return None;
        }
        if self.owning_region(address).is_some() {
            return Some(address);
        }
        self.regions
            .iter()
            .map(|region| region.base() + self.base_address)
            .filter(|&base| base >= address)
            .min()
    }
}
