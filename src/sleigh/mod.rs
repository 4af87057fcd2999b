//! Typed surface over the external SLEIGH lifter.
//!
//! The native decoder is consumed over a narrow C ABI and linked only
//! when the `libsla` cargo feature is enabled. Everything the rest of
//! the crate depends on lives here unconditionally: the [`Decoder`]
//! seam the runtime lifts through, and owned copies of the raw
//! descriptors the decoder emits. Downstream code never sees a C
//! pointer.

#[cfg(feature = "libsla")]
pub mod ffi;
#[cfg(feature = "libsla")]
mod native;
#[cfg(feature = "libsla")]
pub use self::native::Sleigh;

use crate::Result;
use std::path::Path;

/// One operand of a raw decoded operation, identified by an
/// address-space name, an offset into that space, and a width in bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawVarnode {
    pub space: String,
    pub offset: u64,
    pub size: u64,
}

/// One raw micro-operation: the decoder's numeric opcode plus its
/// operands in emission order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawOp {
    pub opcode: i32,
    pub inputs: Vec<RawVarnode>,
    pub output: Option<RawVarnode>,
}

/// One decoded machine instruction: its location, its disassembly text,
/// and the micro-operations it expands to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawInsn {
    pub address: u64,
    pub size: u64,
    pub mnemonic: String,
    pub body: String,
    pub ops: Vec<RawOp>,
}

/// One row of the decoder's register table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegisterInfo {
    pub name: String,
    pub offset: u64,
    pub size: u64,
}

/// The seam between the runtime and whatever produces raw instructions.
///
/// The native `Sleigh` wrapper is the production implementation; tests
/// drive the runtime through canned decoders.
pub trait Decoder {
    /// Load a compiled SLEIGH spec. Must precede `begin`.
    fn load_spec(&mut self, path: &Path) -> Result<()>;

    /// Start the decoder. Every operation below requires this.
    fn begin(&mut self) -> Result<()>;

    /// Set the process-wide default of one context variable.
    fn set_context_default(&mut self, name: &str, value: u32) -> Result<()>;

    /// Stage a byte region inside the decoder's address space.
    fn load_bytes(&mut self, address: u64, bytes: &[u8]) -> Result<()>;

    /// Decode the instruction at `address`, or `None` when the bytes
    /// there do not decode.
    fn lift_at(&mut self, address: u64) -> Result<Option<RawInsn>>;

    /// The register table declared by the loaded spec.
    fn registers(&mut self) -> Result<Vec<RegisterInfo>>;

    /// The user-defined operation names declared by the loaded spec.
    fn user_ops(&mut self) -> Result<Vec<String>>;
}
