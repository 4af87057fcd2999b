//! Kestrel: a SLEIGH-backed lifting pipeline for gadget discovery.
//!
//! Kestrel turns raw machine-code images into a flat stream of lifted,
//! semantically-labelled IL blocks. Decoding is delegated to an external
//! SLEIGH lifter over a narrow C ABI, so adding a new architecture is a
//! matter of supplying a processor spec rather than writing new code. A
//! quick synopsis of kestrel's modules:
//!
//! * **il** - Kestrel's intermediate language: operands, operations,
//!   register descriptors, and per-instruction semantic summaries.
//! * **loader** - Readers that turn region dumps, raw images, and
//!   processor specs into in-memory inputs.
//! * **memory** - Named byte regions with containment tests.
//! * **runtime** - Drives the decoder over a target and emits blocks.
//! * **sleigh** - The typed shim over the native lifter's C ABI.
//! * **target** - An ordered collection of regions with a shared rebase
//!   and a sparse-address cursor.
//!
//! ```no_run
//! use kestrel::loader;
//! use kestrel::target::Target;
//! use std::path::Path;
//!
//! # fn example() -> kestrel::Result<()> {
//! let regions = loader::regions_from_dump(Path::new("image.json"))?;
//! let mut target = Target::from_regions(regions);
//! target.set_base_address(0x40_0000);
//! target.set_spec_path("specs/x86-64.sla");
//! target.set_context(loader::context_from_pspec(Path::new("specs/x86-64.pspec"))?);
//! # Ok(())
//! # }
//! ```

pub mod il;
pub mod loader;
pub mod memory;
pub mod runtime;
pub mod sleigh;
pub mod target;

use std::path::PathBuf;
use std::rc::Rc;

/// Reference-counted handle for values that live as long as the runtime.
///
/// The decoder keeps process-wide mutable state, so the whole pipeline is
/// single-threaded and plain `Rc` is sufficient.
pub type RC<T> = Rc<T>;

/// Kestrel error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A context variable name the loaded spec never declared.
    #[error("unknown context variable {0:?}")]
    BadContextVariable(String),

    /// The decoder emitted an operation descriptor the shim could not read.
    #[error("malformed operation descriptor from the decoder")]
    BadOperation,

    /// A varnode referenced an address space the IL does not model.
    #[error("unsupported varnode space {0:?}")]
    BadVarSpace(String),

    /// A decoder operation was attempted before `begin`.
    #[error("the decoder has not been started; call begin first")]
    CallBeginFirst,

    /// The decoder reported a failure it did not classify.
    #[error("the decoder reported an unspecified failure")]
    Fail,

    /// A region dump carried a payload that is not valid hex.
    #[error("invalid hex in region dump: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The decoder returned an instruction descriptor that does not hold
    /// together.
    #[error("undecodable instruction descriptor")]
    InsnDecodeError,

    /// The decoder rejected a processor spec document.
    #[error("invalid processor spec {0:?}")]
    InvalidPspec(PathBuf),

    /// An operand referenced a register the loaded spec never declared.
    #[error("no register at offset {offset:#x} with width {width}")]
    InvalidRegisterLookup { offset: u64, width: u64 },

    /// The decoder rejected a compiled SLEIGH spec.
    #[error("invalid sleigh spec {0:?}")]
    InvalidSpec(PathBuf),

    /// A region dump is not well-formed JSON.
    #[error("region dump is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration selected no input to load, or a target without
    /// a processor spec.
    #[error("no input was configured")]
    NoInputMode,

    /// A lift was requested before a target was loaded.
    #[error("no target has been loaded")]
    NoTarget,

    /// A second target load was attempted on a live runtime.
    #[error("a target is already loaded")]
    TargetPresent,

    /// The decoder could not decode the bytes at an address.
    #[error("unable to lift at {0:#x}")]
    UnableToLift(u64),

    /// An input file could not be read.
    #[error("unable to load file {path:?}: {reason}")]
    UnableToLoadFile { path: PathBuf, reason: String },

    /// The decoder handle could not be created or initialised.
    #[error("the decoder is not initialised")]
    Uninit,

    /// A processor spec is not well-formed XML.
    #[error("processor spec is not valid XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
