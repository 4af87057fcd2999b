//! Per-instruction semantic labels consumed by the gadget search.

use crate::il::{OpKind, Operation};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Boolean labels summarising one decoded instruction.
    ///
    /// Only `RET`, `JUMP`, `CALL`, `MODIFIES_SP`, and `UNIMPLEMENTED`
    /// are populated by the current pipeline; the remaining flags are
    /// reserved for analyses that do not exist yet and always read
    /// clear.
    #[derive(Deserialize, Serialize)]
    pub struct Semantics: u32 {
        const PURE          = 1;
        const REGISTER_PURE = 1 << 1;
        const ATOMIC        = 1 << 2;
        const MSR_ACCESS    = 1 << 3;
        const RET           = 1 << 4;
        const JUMP          = 1 << 5;
        const CALL          = 1 << 6;
        const HALT          = 1 << 7;
        const INTERRUPT     = 1 << 8;
        const MODIFIES_SP   = 1 << 9;
        const UNIMPLEMENTED = 1 << 10;
    }
}

impl Semantics {
    /// Label an operation sequence. Computed once per lifted block and
    /// immutable afterwards.
    pub fn summarize(operations: &[Operation]) -> Semantics {
        let mut semantics = Semantics::empty();
        for operation in operations {
            if operation.modifies_stack_pointer() {
                semantics |= Semantics::MODIFIES_SP;
            }
            match operation.kind() {
                OpKind::Unimplemented => semantics |= Semantics::UNIMPLEMENTED,
                OpKind::Return => semantics |= Semantics::RET,
                OpKind::Branch | OpKind::BranchConditional | OpKind::BranchIndirect => {
                    semantics |= Semantics::JUMP
                }
                OpKind::Call | OpKind::CallIndirect => semantics |= Semantics::CALL,
                _ => {}
            }
        }
        semantics
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: &[(Semantics, &str)] = &[
            (Semantics::PURE, "pure"),
            (Semantics::REGISTER_PURE, "register-pure"),
            (Semantics::ATOMIC, "atomic"),
            (Semantics::MSR_ACCESS, "msr-access"),
            (Semantics::RET, "ret"),
            (Semantics::JUMP, "jump"),
            (Semantics::CALL, "call"),
            (Semantics::HALT, "halt"),
            (Semantics::INTERRUPT, "interrupt"),
            (Semantics::MODIFIES_SP, "modifies-sp"),
            (Semantics::UNIMPLEMENTED, "unimplemented"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(*flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}
