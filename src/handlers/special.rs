//! NOOP family and SYSCALL. Grounded on spec §9 SUPPLEMENT C.9: the
//! no-effect opcodes are consumed without emitting IR; `SYSCALL` lowers to
//! an opaque extern call following the System V AMD64 syscall ABI (`RAX` =
//! number, `RDI`/`RSI`/`RDX`/`R10`/`R8`/`R9` = arguments), with the return
//! value stored back into `RAX`.

use crate::collab::{DecompilerContext, Disassembler};
use crate::dispatcher::Emitter;
use crate::helpers::{get_reg_val, store_reg_val};
use crate::ir::InstKind;
use crate::operand::Instruction;
use crate::reg::{Canonical, Register};
use crate::value::Width;

/// `NOOP`/`NOOPL`/`NOOPW`/the `REP` prefix standing alone/`HLT`: none of
/// these have any architectural effect this core models, so the handler
/// consumes the instruction without emitting anything (spec §1 Non-goals:
/// no side effects to lift).
pub fn noop<D: Disassembler, C: DecompilerContext>(_e: &mut Emitter<D, C>, inst: &Instruction) {
    tracing::trace!(opcode = ?inst.opcode, "no-op instruction, nothing lifted");
}

pub fn syscall<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, _inst: &Instruction) {
    let abi = [
        Canonical::Rax,
        Canonical::Rdi,
        Canonical::Rsi,
        Canonical::Rdx,
        Canonical::R10,
        Canonical::R8,
        Canonical::R9,
    ];
    let args = abi
        .into_iter()
        .map(|c| get_reg_val(&mut e.builder, Register::Full(c)))
        .collect();
    let result = e.builder.emit(InstKind::ExternCall {
        symbol: "saib_syscall".into(),
        args,
        result_width: Some(Width::W64),
    });
    store_reg_val(&mut e.builder, Register::Full(Canonical::Rax), result);
}
