//! Classified references to the operands of lifted operations.

use crate::il::{RegisterDescriptor, RegisterMap};
use crate::sleigh::RawVarnode;
use crate::{Error, Result, RC};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One operand of a lifted operation.
///
/// Every varnode the decoder emits is classified into one of four
/// reference kinds before downstream code sees it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Operand {
    /// An immediate value.
    Constant { value: u64, width: u64 },
    /// A handle into the runtime's register map. Handles stay valid for
    /// the runtime's lifetime.
    Register(RC<RegisterDescriptor>),
    /// An absolute location in a memory-backed address space.
    Memory { address: u64, width: u64 },
    /// A slot in the decoder's scratch space for intra-instruction
    /// temporaries.
    Unique { slot: u64, width: u64 },
}

impl Operand {
    /// Classify a raw varnode by its address-space name.
    ///
    /// Register varnodes resolve through `registers`; a miss means the
    /// decoder emitted IL against a register the loaded spec never
    /// declared, which is a hard error. Spaces the IL does not model
    /// (`join`, `iop`, `fspec`, …) are rejected rather than guessed at.
    pub fn from_varnode(varnode: &RawVarnode, registers: &RegisterMap) -> Result<Operand> {
        match varnode.space.as_str() {
            "ram" | "data" | "code" | "stack" => Ok(Operand::Memory {
                address: varnode.offset,
                width: varnode.size,
            }),
            "const" => Ok(Operand::Constant {
                value: varnode.offset,
                width: varnode.size,
            }),
            "unique" => Ok(Operand::Unique {
                slot: varnode.offset,
                width: varnode.size,
            }),
            "register" => registers
                .lookup(varnode.offset, varnode.size)
                .map(Operand::Register)
                .ok_or(Error::InvalidRegisterLookup {
                    offset: varnode.offset,
                    width: varnode.size,
                }),
            _ => Err(Error::BadVarSpace(varnode.space.clone())),
        }
    }

    /// Get the width of this operand in bytes.
    pub fn width(&self) -> u64 {
        match self {
            Operand::Constant { width, .. }
            | Operand::Memory { width, .. }
            | Operand::Unique { width, .. } => *width,
            Operand::Register(register) => register.size(),
        }
    }

    /// Get the register behind this operand, if it is one.
    pub fn register(&self) -> Option<&RC<RegisterDescriptor>> {
        match self {
            Operand::Register(register) => Some(register),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Constant { value, .. } => write!(f, "{}", value),
            Operand::Register(register) => write!(f, "{}", register.name()),
            Operand::Memory { address, .. } => write!(f, "{:#x}", address),
            Operand::Unique { slot, .. } => write!(f, "Unique{}", slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il;
    use crate::sleigh::RegisterInfo;

    fn varnode(space: &str, offset: u64, size: u64) -> RawVarnode {
        RawVarnode {
            space: space.to_string(),
            offset,
            size,
        }
    }

    fn one_register_map() -> RegisterMap {
        RegisterMap::from_table(vec![RegisterInfo {
            name: "rax".to_string(),
            offset: 0,
            size: 8,
        }])
    }

    #[test]
    fn memory_backed_spaces_classify_as_memory() {
        let registers = RegisterMap::new();
        for space in &["ram", "data", "code", "stack"] {
            let operand = Operand::from_varnode(&varnode(space, 0x80, 4), &registers).unwrap();
            assert_eq!(operand, il::memory(0x80, 4));
        }
    }

    #[test]
    fn constants_and_uniques_carry_their_payloads() {
        let registers = RegisterMap::new();
        assert_eq!(
            Operand::from_varnode(&varnode("const", 7, 8), &registers).unwrap(),
            il::constant(7, 8)
        );
        assert_eq!(
            Operand::from_varnode(&varnode("unique", 0x2480, 2), &registers).unwrap(),
            il::unique(0x2480, 2)
        );
    }

    #[test]
    fn register_operands_resolve_through_the_map() {
        let registers = one_register_map();
        let operand = Operand::from_varnode(&varnode("register", 0, 8), &registers).unwrap();
        assert_eq!(operand.register().unwrap().name(), "rax");
        assert_eq!(operand.width(), 8);
    }

    #[test]
    fn unknown_registers_are_hard_errors() {
        let registers = one_register_map();
        match Operand::from_varnode(&varnode("register", 0x1234, 4), &registers) {
            Err(Error::InvalidRegisterLookup { offset, width }) => {
                assert_eq!(offset, 0x1234);
                assert_eq!(width, 4);
            }
            other => panic!("expected a register lookup failure, got {:?}", other),
        }
    }

    #[test]
    fn unmodelled_spaces_are_rejected() {
        let registers = RegisterMap::new();
        for space in &["join", "iop", "fspec", "RAM", ""] {
            match Operand::from_varnode(&varnode(space, 0, 8), &registers) {
                Err(Error::BadVarSpace(name)) => assert_eq!(name, *space),
                other => panic!("expected a bad-space failure for {:?}, got {:?}", space, other),
            }
        }
    }

    #[test]
    fn display_forms() {
        let registers = one_register_map();
        assert_eq!(il::constant(42, 8).to_string(), "42");
        assert_eq!(il::memory(0x1000, 8).to_string(), "0x1000");
        assert_eq!(il::unique(3, 4).to_string(), "Unique3");
        assert_eq!(
            Operand::Register(registers.lookup(0, 8).unwrap()).to_string(),
            "rax"
        );
    }
}
