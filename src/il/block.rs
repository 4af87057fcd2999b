//! A lifted machine instruction: its operations plus the labels the
//! gadget search steers by.

use crate::il::{Operation, RegisterMap, Semantics};
use crate::sleigh::RawInsn;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded machine instruction lifted into IL.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Block {
    address: u64,
    size: u64,
    text: String,
    operations: Vec<Operation>,
    semantics: Semantics,
}

impl Block {
    /// Lift one raw decoded instruction.
    ///
    /// Operations convert in decoder emission order and the first
    /// operand failure aborts the whole block; the semantic summary is
    /// computed once at the end. An empty operation list is legal, the
    /// decoder emits one for nop-equivalents.
    pub fn from_raw(raw: &RawInsn, registers: &RegisterMap) -> Result<Block> {
        let mut operations = Vec::with_capacity(raw.ops.len());
        for op in &raw.ops {
            operations.push(Operation::from_raw(op, registers)?);
        }
        let semantics = Semantics::summarize(&operations);
        let text = if raw.body.is_empty() {
            raw.mnemonic.clone()
        } else {
            format!("{} {}", raw.mnemonic, raw.body)
        };
        Ok(Block {
            address: raw.address,
            size: raw.size,
            text,
            operations,
            semantics,
        })
    }

    /// Get the address this instruction was decoded at.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Get the size of this instruction in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the pretty-printed disassembly of this instruction.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the lifted operations, in decoder emission order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Get the semantic summary of this instruction.
    pub fn semantics(&self) -> Semantics {
        self.semantics
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:#x} {}", self.address, self.text)?;
        for operation in &self.operations {
            writeln!(f, "  {}", operation)?;
        }
        Ok(())
    }
}
