//! PUSH/POP/LEAVE. Grounded on `IREmitter-MOV.cpp`'s memory read/write
//! shape applied to the stack pointer (spec §4.4): every push/pop is a
//! `RSP`-relative store/load plus an 8-byte adjustment to `RSP` itself.

use crate::collab::{DecompilerContext, Disassembler};
use crate::consts::STACK_SLOT_BYTES;
use crate::dispatcher::Emitter;
use crate::helpers::{get_imm_val, get_reg_val, store_reg_val};
use crate::ir::{BinOp, InstKind};
use crate::operand::{Instruction, Operand, Operands};
use crate::reg::{Canonical, Register};
use crate::value::{ValueId, Width};

fn adjust_rsp<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, op: BinOp, amount: i64) -> ValueId {
    let rsp = e.builder.reg_val(Canonical::Rsp);
    let delta = e.builder.emit(InstKind::ConstInt { value: amount as u64, width: Width::W64 });
    let new_rsp = e.builder.emit(InstKind::BinOp { op, lhs: rsp, rhs: delta });
    e.builder.set_reg(Canonical::Rsp, new_rsp);
    new_rsp
}

/// Also accepts an immediate operand (spec §9 SUPPLEMENT C.7): `push
/// $imm32` is common in PLT stub prologues.
pub fn push64r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 1);
    let value = match ops.reg_or_imm(0) {
        Operand::Reg(r) => get_reg_val(&mut e.builder, r),
        Operand::Imm(v) => get_imm_val(&mut e.builder, v, Width::W32, Width::W64),
        _ => unreachable!("Operands::reg_or_imm only returns Reg or Imm"),
    };
    let new_rsp = adjust_rsp(e, BinOp::Sub, STACK_SLOT_BYTES as i64);
    let addr = e.builder.emit(InstKind::EffectiveAddr {
        base: Some(new_rsp),
        index: None,
        scale: 1,
        disp: 0,
    });
    e.builder.emit(InstKind::Store { addr, value });
}

pub fn pop64r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 1);
    let dst = ops.reg(0);
    let rsp = e.builder.reg_val(Canonical::Rsp);
    let addr = e.builder.emit(InstKind::EffectiveAddr {
        base: Some(rsp),
        index: None,
        scale: 1,
        disp: 0,
    });
    let value = e.builder.emit(InstKind::Load { addr, width: Width::W64 });
    store_reg_val(&mut e.builder, dst, value);
    adjust_rsp(e, BinOp::Add, STACK_SLOT_BYTES as i64);
}

/// `LEAVE`: `RSP = RBP`, then pop into `RBP` (spec §9 SUPPLEMENT C.8).
pub fn leave64<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, _inst: &Instruction) {
    let rbp = e.builder.reg_val(Canonical::Rbp);
    e.builder.set_reg(Canonical::Rsp, rbp);
    let addr = e.builder.emit(InstKind::EffectiveAddr {
        base: Some(rbp),
        index: None,
        scale: 1,
        disp: 0,
    });
    let value = e.builder.emit(InstKind::Load { addr, width: Width::W64 });
    store_reg_val(&mut e.builder, Register::Full(Canonical::Rbp), value);
    adjust_rsp(e, BinOp::Add, STACK_SLOT_BYTES as i64);
}
