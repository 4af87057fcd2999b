//! Drives the decoder over a loaded target and emits lifted blocks.

use crate::il::{Block, RegisterMap};
use crate::sleigh::Decoder;
#[cfg(feature = "libsla")]
use crate::sleigh::Sleigh;
use crate::target::Target;
use crate::{Error, Result};
use log::{debug, trace, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Empty,
    Loaded,
    Lifted,
}

/// The lifting runtime.
///
/// A runtime owns one decoder, the register map built from the loaded
/// spec, and at most one target. Register handles copied into lifted
/// blocks stay valid for the runtime's lifetime.
pub struct Runtime<D> {
    decoder: D,
    registers: RegisterMap,
    target: Option<Target>,
    state: State,
}

#[cfg(feature = "libsla")]
impl Runtime<Sleigh> {
    /// Create a runtime over the native SLEIGH decoder.
    pub fn new() -> Result<Runtime<Sleigh>> {
        Ok(Runtime::with_decoder(Sleigh::new()?))
    }
}

impl<D: Decoder> Runtime<D> {
    /// Create a runtime over any decoder implementation.
    pub fn with_decoder(decoder: D) -> Runtime<D> {
        Runtime {
            decoder,
            registers: RegisterMap::new(),
            target: None,
            state: State::Empty,
        }
    }

    /// Get the decoder this runtime drives.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Get the register map built from the loaded spec. Empty until a
    /// target is loaded.
    pub fn registers(&self) -> &RegisterMap {
        &self.registers
    }

    /// Get the loaded target, if any.
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Hand a target to the decoder: spec, context, registers, bytes.
    ///
    /// A runtime accepts exactly one target. Context pairs the spec does
    /// not declare are skipped with a warning; their values are 32 bits
    /// on the decoder side and wider values are truncated.
    pub fn load_target(&mut self, target: Target) -> Result<()> {
        if self.state != State::Empty {
            return Err(Error::TargetPresent);
        }
        let spec_path = target.spec_path().ok_or(Error::NoInputMode)?.to_path_buf();

        self.decoder.load_spec(&spec_path)?;
        self.decoder.begin()?;

        for (name, value) in target.context() {
            match self.decoder.set_context_default(name, *value as u32) {
                Ok(()) => {}
                Err(Error::BadContextVariable(name)) => {
                    warn!("spec names unknown context variable {:?}; skipping", name);
                }
                Err(e) => return Err(e),
            }
        }

        self.registers = RegisterMap::from_table(self.decoder.registers()?);
        debug!("register map holds {} registers", self.registers.len());

        let user_ops = self.decoder.user_ops()?;
        debug!("spec declares {} user ops", user_ops.len());

        for region in target.regions_rebased() {
            trace!("mapping {} into the decoder", region);
            self.decoder.load_bytes(region.base(), region.data())?;
        }

        self.target = Some(target);
        self.state = State::Loaded;
        Ok(())
    }

    /// Walk the target's sparse address space and lift every decodable
    /// instruction into a block.
    ///
    /// Blocks come out in strictly increasing address order. Undecodable
    /// bytes cost one alignment unit; an instruction whose operands fail
    /// to classify is skipped whole, at the price of its own length.
    pub fn lift(&mut self) -> Result<Vec<Block>> {
        let target = self.target.as_ref().ok_or(Error::NoTarget)?;

        let mut blocks = Vec::new();
        let mut cursor = target.base_address();

        while let Some(address) = target.next_address(cursor) {
            cursor = address;
            let raw = match self.decoder.lift_at(cursor)? {
                // a zero-length decode would stall the walk; treat it as
                // undecodable so the cursor strictly increases
                Some(raw) if raw.size > 0 => raw,
                _ => {
                    cursor += target.alignment();
                    continue;
                }
            };

            match Block::from_raw(&raw, &self.registers) {
                Ok(block) => {
                    trace!("lifted {:#x} {}", block.address(), block.text());
                    blocks.push(block);
                }
                Err(e) => trace!("skipping instruction at {:#x}: {}", cursor, e),
            }
            cursor += raw.size;
        }

        debug!("lifted {} blocks", blocks.len());
        self.state = State::Lifted;
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::Semantics;
    use crate::memory::MemoryRegion;
    use crate::sleigh::{RawInsn, RawOp, RawVarnode, RegisterInfo};
    use std::collections::BTreeMap;
    use std::path::Path;

    /// Serves canned instructions keyed by address.
    struct MockDecoder {
        insns: BTreeMap<u64, RawInsn>,
        registers: Vec<RegisterInfo>,
        known_context: Vec<&'static str>,
        mapped: Vec<(u64, u64)>,
    }

    impl MockDecoder {
        fn new(insns: Vec<RawInsn>) -> MockDecoder {
            MockDecoder {
                insns: insns.into_iter().map(|i| (i.address, i)).collect(),
                registers: Vec::new(),
                known_context: Vec::new(),
                mapped: Vec::new(),
            }
        }
    }

    impl Decoder for MockDecoder {
        fn load_spec(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn begin(&mut self) -> Result<()> {
            Ok(())
        }

        fn set_context_default(&mut self, name: &str, _value: u32) -> Result<()> {
            if self.known_context.iter().any(|known| *known == name) {
                Ok(())
            } else {
                Err(Error::BadContextVariable(name.to_string()))
            }
        }

        fn load_bytes(&mut self, address: u64, bytes: &[u8]) -> Result<()> {
            self.mapped.push((address, bytes.len() as u64));
            Ok(())
        }

        fn lift_at(&mut self, address: u64) -> Result<Option<RawInsn>> {
            Ok(self.insns.get(&address).cloned())
        }

        fn registers(&mut self) -> Result<Vec<RegisterInfo>> {
            Ok(self.registers.clone())
        }

        fn user_ops(&mut self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn ret_insn(address: u64, size: u64) -> RawInsn {
        RawInsn {
            address,
            size,
            mnemonic: "ret".to_string(),
            body: String::new(),
            ops: vec![RawOp {
                opcode: 10,
                inputs: vec![RawVarnode {
                    space: "const".to_string(),
                    offset: 0,
                    size: 8,
                }],
                output: None,
            }],
        }
    }

    fn flat_target(len: usize) -> Target {
        let mut target =
            Target::from_regions(vec![MemoryRegion::new("image", 0, vec![0u8; len])]);
        target.set_spec_path("image.sla");
        target
    }

    #[test]
    fn sparse_images_lift_around_holes() {
        // decodable at 0x0 (4 bytes), garbage at 0x4, decodable at 0x6
        let decoder = MockDecoder::new(vec![ret_insn(0x0, 4), ret_insn(0x6, 2)]);
        let mut runtime = Runtime::with_decoder(decoder);
        runtime.load_target(flat_target(8)).unwrap();

        let blocks = runtime.lift().unwrap();
        let addresses: Vec<u64> = blocks.iter().map(Block::address).collect();
        assert_eq!(addresses, vec![0x0, 0x6]);
    }

    #[test]
    fn blocks_arrive_in_increasing_address_order() {
        let decoder = MockDecoder::new(vec![
            ret_insn(0x0, 2),
            ret_insn(0x2, 2),
            ret_insn(0x4, 2),
        ]);
        let mut runtime = Runtime::with_decoder(decoder);
        runtime.load_target(flat_target(6)).unwrap();

        let blocks = runtime.lift().unwrap();
        let addresses: Vec<u64> = blocks.iter().map(Block::address).collect();
        let mut sorted = addresses.clone();
        sorted.sort_unstable();
        assert_eq!(addresses, sorted);
        assert_eq!(addresses.len(), 3);
    }

    #[test]
    fn a_second_target_is_rejected() {
        let mut runtime = Runtime::with_decoder(MockDecoder::new(Vec::new()));
        runtime.load_target(flat_target(4)).unwrap();
        match runtime.load_target(flat_target(4)) {
            Err(Error::TargetPresent) => {}
            other => panic!("expected TargetPresent, got {:?}", other),
        }
    }

    #[test]
    fn lifting_without_a_target_fails() {
        let mut runtime = Runtime::with_decoder(MockDecoder::new(Vec::new()));
        match runtime.lift() {
            Err(Error::NoTarget) => {}
            other => panic!("expected NoTarget, got {:?}", other),
        }
    }

    #[test]
    fn targets_without_a_spec_path_are_rejected() {
        let mut runtime = Runtime::with_decoder(MockDecoder::new(Vec::new()));
        let target = Target::from_regions(vec![MemoryRegion::new("image", 0, vec![0u8; 4])]);
        match runtime.load_target(target) {
            Err(Error::NoInputMode) => {}
            other => panic!("expected NoInputMode, got {:?}", other),
        }
    }

    #[test]
    fn unknown_context_variables_are_skipped() {
        let mut decoder = MockDecoder::new(Vec::new());
        decoder.known_context = vec!["addrsize"];
        let mut runtime = Runtime::with_decoder(decoder);

        let mut target = flat_target(4);
        target.set_context(vec![
            ("addrsize".to_string(), 1),
            ("bogus".to_string(), 2),
        ]);
        runtime.load_target(target).unwrap();
    }

    #[test]
    fn regions_are_mapped_rebased() {
        let mut runtime = Runtime::with_decoder(MockDecoder::new(Vec::new()));
        let mut target = flat_target(8);
        target.set_base_address(0x1000);
        runtime.load_target(target).unwrap();
        assert_eq!(runtime.decoder().mapped, vec![(0x1000, 8)]);
    }

    #[test]
    fn the_register_table_feeds_lifted_operands() {
        let mut decoder = MockDecoder::new(vec![RawInsn {
            address: 0x0,
            size: 2,
            mnemonic: "pop".to_string(),
            body: "rsp".to_string(),
            ops: vec![RawOp {
                opcode: 1,
                inputs: vec![RawVarnode {
                    space: "const".to_string(),
                    offset: 0,
                    size: 8,
                }],
                output: Some(RawVarnode {
                    space: "register".to_string(),
                    offset: 0x20,
                    size: 8,
                }),
            }],
        }]);
        decoder.registers = vec![RegisterInfo {
            name: "rsp".to_string(),
            offset: 0x20,
            size: 8,
        }];
        let mut runtime = Runtime::with_decoder(decoder);
        runtime.load_target(flat_target(2)).unwrap();

        let blocks = runtime.lift().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "pop rsp");
        assert!(blocks[0].semantics().contains(Semantics::MODIFIES_SP));
    }

    #[test]
    fn instructions_against_undeclared_registers_are_skipped() {
        // no register table at all, so the register operand cannot resolve
        let mut insn = ret_insn(0x0, 2);
        insn.ops[0].output = Some(RawVarnode {
            space: "register".to_string(),
            offset: 0x20,
            size: 8,
        });
        let decoder = MockDecoder::new(vec![insn, ret_insn(0x2, 2)]);
        let mut runtime = Runtime::with_decoder(decoder);
        runtime.load_target(flat_target(4)).unwrap();

        let blocks = runtime.lift().unwrap();
        let addresses: Vec<u64> = blocks.iter().map(Block::address).collect();
        assert_eq!(addresses, vec![0x2]);
    }

    #[test]
    fn zero_length_decodes_cannot_stall_the_walk() {
        let decoder = MockDecoder::new(vec![ret_insn(0x0, 0), ret_insn(0x2, 2)]);
        let mut runtime = Runtime::with_decoder(decoder);
        runtime.load_target(flat_target(4)).unwrap();

        let blocks = runtime.lift().unwrap();
        let addresses: Vec<u64> = blocks.iter().map(Block::address).collect();
        assert_eq!(addresses, vec![0x2]);
    }
}
