//! The owning wrapper around the native lifter handle.

use super::ffi;
use super::{Decoder, RawInsn, RawOp, RawVarnode, RegisterInfo};
use crate::{Error, Result};
use std::ffi::CString;
use std::os::raw::c_char;
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Created,
    SpecLoaded,
    Started,
}

/// The native SLEIGH decoder.
///
/// `Sleigh` enforces the call order the native library expects (create,
/// load a spec, begin, then everything else) and copies every returned
/// descriptor into owned types before the caller sees it. The native
/// library keeps process-wide mutable state, so at most one `Sleigh`
/// should be live per process.
pub struct Sleigh {
    manager: *mut ffi::SlaManager,
    state: State,
}

impl Sleigh {
    /// Create a fresh decoder handle.
    pub fn new() -> Result<Sleigh> {
        let manager = unsafe { ffi::sla_new() };
        if manager.is_null() {
            return Err(Error::Uninit);
        }
        Ok(Sleigh {
            manager,
            state: State::Created,
        })
    }

    fn started(&self) -> Result<()> {
        match self.state {
            State::Started => Ok(()),
            _ => Err(Error::CallBeginFirst),
        }
    }

    /// Decode the next instruction in sequence from the image base, or
    /// `None` when the stream is exhausted or undecodable.
    pub fn next_insn(&mut self) -> Result<Option<RawInsn>> {
        self.started()?;
        let desc = unsafe { ffi::sla_next_insn(self.manager) };
        if desc.is_null() {
            return Ok(None);
        }
        unsafe { copy_insn(desc) }.map(Some)
    }
}

impl Decoder for Sleigh {
    fn load_spec(&mut self, path: &Path) -> Result<()> {
        let c_path = CString::new(path.to_string_lossy().as_bytes())
            .map_err(|_| Error::InvalidSpec(path.to_path_buf()))?;
        let status = unsafe { ffi::sla_load_specfile(self.manager, c_path.as_ptr()) };
        if status != 0 {
            return Err(Error::InvalidSpec(path.to_path_buf()));
        }
        self.state = State::SpecLoaded;
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        match self.state {
            State::Created => Err(Error::Uninit),
            State::SpecLoaded => {
                let status = unsafe { ffi::sla_begin(self.manager) };
                if status != 0 {
                    return Err(Error::Fail);
                }
                self.state = State::Started;
                Ok(())
            }
            State::Started => Ok(()),
        }
    }

    fn set_context_default(&mut self, name: &str, value: u32) -> Result<()> {
        self.started()?;
        let c_name =
            CString::new(name).map_err(|_| Error::BadContextVariable(name.to_string()))?;
        let status =
            unsafe { ffi::sla_context_var_set_default(self.manager, c_name.as_ptr(), value) };
        if status != 0 {
            return Err(Error::BadContextVariable(name.to_string()));
        }
        Ok(())
    }

    fn load_bytes(&mut self, address: u64, bytes: &[u8]) -> Result<()> {
        self.started()?;
        let status = unsafe {
            ffi::sla_load_region(self.manager, address, bytes.len() as u64, bytes.as_ptr())
        };
        if status != 0 {
            return Err(Error::Fail);
        }
        Ok(())
    }

    fn lift_at(&mut self, address: u64) -> Result<Option<RawInsn>> {
        self.started()?;
        let desc = unsafe { ffi::sla_lift_insn(self.manager, address) };
        if desc.is_null() {
            return Ok(None);
        }
        // TODO: the ABI exports no sla_insn_free; descriptors are copied
        // here and the native allocation is abandoned, as the reference
        // manager does. Free them once the decoder grows a destructor.
        unsafe { copy_insn(desc) }.map(Some)
    }

    fn registers(&mut self) -> Result<Vec<RegisterInfo>> {
        self.started()?;
        let list = unsafe { ffi::sla_get_all_registers(self.manager) };
        if list.is_null() {
            return Err(Error::Fail);
        }
        let list = unsafe { &*list };
        if list.count > 0 && list.items.is_null() {
            return Err(Error::Fail);
        }
        let mut registers = Vec::with_capacity(list.count as usize);
        for i in 0..list.count as usize {
            let item = unsafe { &*list.items.add(i) };
            registers.push(RegisterInfo {
                name: fixed_str(&item.name),
                offset: item.varnode.offset,
                size: item.varnode.size,
            });
        }
        Ok(registers)
    }

    fn user_ops(&mut self) -> Result<Vec<String>> {
        self.started()?;
        let list = unsafe { ffi::sla_get_user_ops(self.manager) };
        if list.is_null() {
            return Err(Error::Fail);
        }
        let list = unsafe { &*list };
        if list.count > 0 && (list.names.is_null() || list.name_lens.is_null()) {
            return Err(Error::Fail);
        }
        let mut names = Vec::with_capacity(list.count as usize);
        for i in 0..list.count as usize {
            let name = unsafe { *list.names.add(i) };
            let len = unsafe { *list.name_lens.add(i) };
            names.push(unsafe { copy_text(name, len) });
        }
        Ok(names)
    }
}

impl Drop for Sleigh {
    fn drop(&mut self) {
        unsafe { ffi::sla_free(self.manager) };
    }
}

/// Copy one instruction descriptor into owned types.
unsafe fn copy_insn(desc: *const ffi::InsnDesc) -> Result<RawInsn> {
    let desc = &*desc;
    if desc.op_count > 0 && desc.ops.is_null() {
        return Err(Error::InsnDecodeError);
    }
    let mut ops = Vec::with_capacity(desc.op_count as usize);
    for i in 0..desc.op_count as usize {
        ops.push(copy_op(&*desc.ops.add(i))?);
    }
    Ok(RawInsn {
        address: desc.address,
        size: desc.size,
        mnemonic: copy_text(desc.mnemonic, desc.mnemonic_len),
        body: copy_text(desc.body, desc.body_len),
        ops,
    })
}

unsafe fn copy_op(op: &ffi::PcodeOp) -> Result<RawOp> {
    if op.input_len > 0 && op.inputs.is_null() {
        return Err(Error::BadOperation);
    }
    let mut inputs = Vec::with_capacity(op.input_len as usize);
    for i in 0..op.input_len as usize {
        inputs.push(copy_varnode(&*op.inputs.add(i)));
    }
    let output = if op.output.is_null() {
        None
    } else {
        Some(copy_varnode(&*op.output))
    };
    Ok(RawOp {
        opcode: op.opcode,
        inputs,
        output,
    })
}

unsafe fn copy_varnode(varnode: &ffi::VarnodeDesc) -> RawVarnode {
    RawVarnode {
        space: fixed_str(&varnode.space),
        offset: varnode.offset,
        size: varnode.size,
    }
}

/// Read a NUL-padded fixed-width name buffer.
fn fixed_str(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Copy a length-delimited text field. A null pointer reads as empty.
unsafe fn copy_text(text: *const c_char, len: u64) -> String {
    if text.is_null() {
        return String::new();
    }
    let bytes = std::slice::from_raw_parts(text as *const u8, len as usize);
    String::from_utf8_lossy(bytes).into_owned()
}
