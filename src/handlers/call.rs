//! CALL/RET. Grounded on `IREmitter.cpp`'s `visitCALL64pcrel32`/
//! `visitCALL64r`/`visitCALL64m`/`visitRET`: every call form first pushes
//! the return address (`RSP -= 8; [RSP] = RIP`, identical to
//! [`crate::handlers::stack::push64r`]'s shape) before resolving (or
//! failing to resolve) where control goes; `RET` is the mirror image,
//! popping that address back into the `RIP` cell (spec §4.4).
//!
//! A direct call first checks the decompiler's known-function table, then
//! falls back to resolving a PLT stub symbol; either produces a
//! [`Terminator::Call`] that returns to the instruction's own fallthrough.
//! `CALL64r` has no statically known target, so rather than guessing it
//! still emits the `saib_collect_indirect` instrumentation hook as a
//! [`Terminator::Call`] of its own (spec §4.4's literal reading: "emit a
//! call to the external helper `saib_collect_indirect`"). Anything left
//! wholly unresolved (`CALL64m`, or a direct call that resolves to neither
//! a known function nor a PLT stub) terminates the block as
//! [`Terminator::Unreachable`] instead of guessing (spec §7, `DESIGN.md`
//! Open Question decisions).

use crate::collab::{CollabError, DecompilerContext, Disassembler, SectionKind};
use crate::consts::STACK_SLOT_BYTES;
use crate::dispatcher::Emitter;
use crate::helpers::{get_mem_val, get_reg_val, store_reg_val};
use crate::ir::{BinOp, InstKind, Terminator};
use crate::operand::{Instruction, Operands};
use crate::reg::{Canonical, Register};
use crate::value::Width;

/// `RSP -= 8; [RSP] = RIP` — the return-address push every `CALL*` form
/// performs before anything else (spec §4.4: "stack-push RIP as above").
fn push_return_address<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>) {
    let rsp = e.builder.reg_val(Canonical::Rsp);
    let delta = e.builder.emit(InstKind::ConstInt {
        value: STACK_SLOT_BYTES,
        width: Width::W64,
    });
    let new_rsp = e.builder.emit(InstKind::BinOp { op: BinOp::Sub, lhs: rsp, rhs: delta });
    e.builder.set_reg(Canonical::Rsp, new_rsp);
    let rip = e.builder.reg_val(Canonical::Rip);
    let addr = e.builder.emit(InstKind::EffectiveAddr {
        base: Some(new_rsp),
        index: None,
        scale: 1,
        disp: 0,
    });
    e.builder.emit(InstKind::Store { addr, value: rip });
}

fn resolve_direct_callee<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, target: u64) -> Option<String> {
    if let Some(f) = e.function_by_addr(target) {
        return Some(f.0);
    }
    match e.section_containing(target) {
        Ok(SectionKind::Plt) => e.resolve_plt_symbol(target),
        Ok(SectionKind::Other) => None,
        Err(CollabError::SectionLookup { address, reason }) => {
            tracing::debug!(address, %reason, "section lookup failed for call target");
            None
        }
    }
}

pub fn call64pcrel32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 2);
    let disp = ops.imm(0);
    ops.fixed_reg(1, Register::Full(Canonical::Rsp));
    let target = e.target_address(inst, disp);
    push_return_address(e);
    match resolve_direct_callee(e, target) {
        Some(callee) => {
            let fallthrough = e.fallthrough_address(inst);
            let continuation = e.builder.get_or_create_basic_block(&format!("bb_{fallthrough}"));
            e.builder.terminate(Terminator::Call { callee, args: Vec::new(), continuation });
        }
        None => e.builder.terminate(Terminator::Unreachable),
    }
}

/// No statically known target; pushes the return address like every other
/// `CALL*` form, then lowers to a call of the `saib_collect_indirect`
/// instrumentation hook with the (unresolved) target value as its sole
/// argument, returning to the instruction's fallthrough (spec §4.4).
pub fn call64r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 2);
    let target_reg = ops.reg(0);
    ops.fixed_reg(1, Register::Full(Canonical::Rsp));
    let target_val = get_reg_val(&mut e.builder, target_reg);
    push_return_address(e);
    let fallthrough = e.fallthrough_address(inst);
    let continuation = e.builder.get_or_create_basic_block(&format!("bb_{fallthrough}"));
    e.builder.terminate(Terminator::Call {
        callee: "saib_collect_indirect".into(),
        args: vec![target_val],
        continuation,
    });
}

/// Memory-indirect call: the target operand is never read (the original
/// computes it but never uses it — memory-indirect calls aren't modelled
/// beyond the return-address push), and the block ends unreachable (spec
/// §4.4, §7).
pub fn call64m<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 6);
    let mem = ops.mem_group(0);
    ops.fixed_reg(5, Register::Full(Canonical::Rsp));
    let _ = get_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, Width::W64);
    push_return_address(e);
    e.builder.terminate(Terminator::Unreachable);
}

/// `[RSP]` into the `RIP` cell, `RSP += 8`, then a void return (spec §4.4:
/// "load `[RSP]` into RIP cell; RSP ← RSP+8; emit a void return terminator").
pub fn ret<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, _inst: &Instruction) {
    let rsp = e.builder.reg_val(Canonical::Rsp);
    let addr = e.builder.emit(InstKind::EffectiveAddr {
        base: Some(rsp),
        index: None,
        scale: 1,
        disp: 0,
    });
    let value = e.builder.emit(InstKind::Load { addr, width: Width::W64 });
    store_reg_val(&mut e.builder, Register::Full(Canonical::Rip), value);
    let delta = e.builder.emit(InstKind::ConstInt {
        value: STACK_SLOT_BYTES,
        width: Width::W64,
    });
    let new_rsp = e.builder.emit(InstKind::BinOp { op: BinOp::Add, lhs: rsp, rhs: delta });
    e.builder.set_reg(Canonical::Rsp, new_rsp);
    e.builder.terminate(Terminator::RetVoid);
}
