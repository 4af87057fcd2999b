//! Kestrel Intermediate Language.

pub mod block;
pub mod operand;
pub mod operation;
pub mod register;
pub mod summary;

pub use self::block::*;
pub use self::operand::*;
pub use self::operation::*;
pub use self::register::*;
pub use self::summary::*;

/// A convenience function to create a new constant operand.
pub fn constant(value: u64, width: u64) -> Operand {
    Operand::Constant { value, width }
}

/// A convenience function to create a new memory operand.
pub fn memory(address: u64, width: u64) -> Operand {
    Operand::Memory { address, width }
}

/// A convenience function to create a new unique-temporary operand.
pub fn unique(slot: u64, width: u64) -> Operand {
    Operand::Unique { slot, width }
}
