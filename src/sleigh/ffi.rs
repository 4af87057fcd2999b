//! Raw C ABI of the native SLEIGH manager library.
//!
//! Struct layouts mirror the library's headers exactly; integers are
//! explicit 64-bit fields. Status-returning calls yield 0 on success.

use std::os::raw::c_char;

#[repr(C)]
pub struct VarnodeDesc {
    pub space: [c_char; 16],
    pub offset: u64,
    pub size: u64,
}

#[repr(C)]
pub struct PcodeOp {
    pub opcode: i32,
    pub output: *mut VarnodeDesc,
    pub input_len: u64,
    pub inputs: *mut VarnodeDesc,
}

#[repr(C)]
pub struct InsnDesc {
    pub op_count: u64,
    pub ops: *mut PcodeOp,
    pub size: u64,
    pub address: u64,
    pub mnemonic: *mut c_char,
    pub mnemonic_len: u64,
    pub body: *mut c_char,
    pub body_len: u64,
}

#[repr(C)]
pub struct RegisterDesc {
    pub name: [c_char; 64],
    pub varnode: VarnodeDesc,
}

#[repr(C)]
pub struct RegisterList {
    pub count: u64,
    pub items: *mut RegisterDesc,
}

#[repr(C)]
pub struct UserOpList {
    pub count: u64,
    pub name_lens: *mut u64,
    pub names: *mut *mut c_char,
}

/// Opaque manager handle.
#[repr(C)]
pub struct SlaManager {
    _opaque: [u8; 0],
}

#[link(name = "sla")]
extern "C" {
    pub fn sla_new() -> *mut SlaManager;
    pub fn sla_free(manager: *mut SlaManager);
    pub fn sla_load_region(
        manager: *mut SlaManager,
        address: u64,
        size: u64,
        data: *const u8,
    ) -> i32;
    pub fn sla_load_specfile(manager: *mut SlaManager, path: *const c_char) -> i32;
    pub fn sla_begin(manager: *mut SlaManager) -> i32;
    pub fn sla_next_insn(manager: *mut SlaManager) -> *mut InsnDesc;
    pub fn sla_lift_insn(manager: *mut SlaManager, address: u64) -> *mut InsnDesc;
    pub fn sla_context_var_set_default(
        manager: *mut SlaManager,
        key: *const c_char,
        value: u32,
    ) -> i32;
    pub fn sla_get_all_registers(manager: *mut SlaManager) -> *mut RegisterList;
    pub fn sla_get_user_ops(manager: *mut SlaManager) -> *mut UserOpList;
}
