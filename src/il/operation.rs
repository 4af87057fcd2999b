//! Lifted operations and the compressed opcode set.

use crate::il::{Operand, RegisterMap};
use crate::sleigh::RawOp;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

// Raw opcode values as emitted by the decoder's opcode table.
const RAW_COPY: i32 = 1;
const RAW_LOAD: i32 = 2;
const RAW_STORE: i32 = 3;
const RAW_BRANCH: i32 = 4;
const RAW_CBRANCH: i32 = 5;
const RAW_BRANCHIND: i32 = 6;
const RAW_CALL: i32 = 7;
const RAW_CALLIND: i32 = 8;
const RAW_RETURN: i32 = 10;

/// The operation tags kestrel keeps out of the decoder's full opcode
/// table.
///
/// Data movement and control transfers keep their own tags; the long
/// tail of arithmetic, logic, and float helpers compresses to
/// `Unimplemented`, because the gadget search steers by control flow and
/// stack effects alone.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum OpKind {
    Unimplemented,
    Copy,
    Store,
    Load,
    Branch,
    BranchConditional,
    BranchIndirect,
    Call,
    CallIndirect,
    Return,
    /// Reserved for operation classes the IL refuses to model. No raw
    /// opcode maps here today.
    NotSupported,
}

impl OpKind {
    /// Compress a raw decoder opcode. Total: any value outside the
    /// mapped set, the user-op escape included, lands on
    /// `Unimplemented`.
    pub fn from_raw(opcode: i32) -> OpKind {
        match opcode {
            RAW_COPY => OpKind::Copy,
            RAW_LOAD => OpKind::Load,
            RAW_STORE => OpKind::Store,
            RAW_BRANCH => OpKind::Branch,
            RAW_CBRANCH => OpKind::BranchConditional,
            RAW_BRANCHIND => OpKind::BranchIndirect,
            RAW_CALL => OpKind::Call,
            RAW_CALLIND => OpKind::CallIndirect,
            RAW_RETURN => OpKind::Return,
            _ => OpKind::Unimplemented,
        }
    }
}

/// One lifted operation: a tag, its input operands in decoder emission
/// order, and an optional output.
///
/// Control transfers carry their destination in their inputs; loads and
/// stores carry the address-space tag as a constant first input and the
/// pointer second, as the decoder emits them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Operation {
    kind: OpKind,
    inputs: Vec<Operand>,
    output: Option<Operand>,
}

impl Operation {
    /// Create a new `Operation`.
    pub fn new(kind: OpKind, inputs: Vec<Operand>, output: Option<Operand>) -> Operation {
        Operation {
            kind,
            inputs,
            output,
        }
    }

    /// Convert one raw decoded operation, classifying every operand.
    pub fn from_raw(raw: &RawOp, registers: &RegisterMap) -> Result<Operation> {
        let mut inputs = Vec::with_capacity(raw.inputs.len());
        for varnode in &raw.inputs {
            inputs.push(Operand::from_varnode(varnode, registers)?);
        }
        let output = match &raw.output {
            Some(varnode) => Some(Operand::from_varnode(varnode, registers)?),
            None => None,
        };
        Ok(Operation::new(OpKind::from_raw(raw.opcode), inputs, output))
    }

    /// Get the tag of this operation.
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    /// Get the input operands of this operation.
    pub fn inputs(&self) -> &[Operand] {
        &self.inputs
    }

    /// Get the output operand of this operation, if it has one.
    pub fn output(&self) -> Option<&Operand> {
        self.output.as_ref()
    }

    /// True if this operation writes a register whose name contains
    /// `sp`.
    ///
    /// The substring test catches `sp`, `esp`, `rsp`, and friends
    /// without per-architecture tables, at the cost of false positives
    /// on registers such as ARM's `spsr` that merely contain the
    /// letters. A precise answer needs the spec to name its stack
    /// pointer, which the decoder does not expose.
    pub fn modifies_stack_pointer(&self) -> bool {
        match &self.output {
            Some(Operand::Register(register)) => register.name().contains("sp"),
            _ => false,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            OpKind::Copy => {
                if let (Some(output), Some(source)) = (&self.output, self.inputs.get(0)) {
                    return write!(f, "{} = {}", output, source);
                }
            }
            OpKind::Load => {
                if let (Some(output), Some(pointer)) = (&self.output, self.inputs.get(1)) {
                    return write!(f, "{} = [{}]", output, pointer);
                }
            }
            OpKind::Store => {
                if let (Some(pointer), Some(value)) = (self.inputs.get(1), self.inputs.get(2)) {
                    return write!(f, "[{}] = {}", pointer, value);
                }
            }
            OpKind::Branch => {
                if let Some(destination) = self.inputs.get(0) {
                    return write!(f, "branch {}", destination);
                }
            }
            OpKind::BranchConditional => {
                if let (Some(destination), Some(condition)) =
                    (self.inputs.get(0), self.inputs.get(1))
                {
                    return write!(f, "branch {} if {}", destination, condition);
                }
            }
            OpKind::BranchIndirect => {
                if let Some(destination) = self.inputs.get(0) {
                    return write!(f, "branch [{}]", destination);
                }
            }
            OpKind::Call => {
                if let Some(destination) = self.inputs.get(0) {
                    return write!(f, "call {}", destination);
                }
            }
            OpKind::CallIndirect => {
                if let Some(destination) = self.inputs.get(0) {
                    return write!(f, "call [{}]", destination);
                }
            }
            OpKind::Return => {
                if let Some(destination) = self.inputs.get(0) {
                    return write!(f, "return {}", destination);
                }
            }
            OpKind::Unimplemented => return write!(f, "unimplemented"),
            OpKind::NotSupported => return write!(f, "not-supported"),
        }
        // operand list too short for the usual form
        write!(f, "{:?}", self.kind)
    }
}
