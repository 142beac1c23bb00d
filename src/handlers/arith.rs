//! ADD/SUB family. Grounded on `IREmitter-ADD.cpp`: a register-register or
//! register-immediate operation, writing the destination and all six
//! EFLAGS sub-flags from the same `lhs`/`rhs`/`result` triple.

use crate::collab::{DecompilerContext, Disassembler};
use crate::dispatcher::Emitter;
use crate::flags::{add_carry_overflow, aux_carry, sub_carry_overflow, zf_sf_pf};
use crate::helpers::{get_imm_val, get_reg_val, store_reg_val};
use crate::ir::{BinOp, InstKind};
use crate::operand::{Instruction, Operands};
use crate::reg::Register;
use crate::value::Width;

/// Shared body for every `ADD*rr`/`ADD*ri8`/`ADD*ri32` variant: `dst = dst +
/// rhs`, all six flags written from the add formulas.
fn addr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, dst: Register, rhs_val: crate::value::ValueId, eflags_idx: usize, ops: &Operands<'_>) {
    ops.eflags(eflags_idx);
    let width = dst.width();
    let lhs = get_reg_val(&mut e.builder, dst);
    let result = e.builder.emit(InstKind::BinOp { op: BinOp::Add, lhs, rhs: rhs_val });
    store_reg_val(&mut e.builder, dst, result);
    write_add_flags(e, lhs, rhs_val, result, width);
}

fn write_add_flags<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, lhs: crate::value::ValueId, rhs: crate::value::ValueId, result: crate::value::ValueId, width: Width) {
    let (cf, of) = add_carry_overflow(&mut e.builder, lhs, rhs, result, width);
    let (zf, sf, pf) = zf_sf_pf(&mut e.builder, result, width);
    let af = aux_carry(&mut e.builder, lhs, rhs, width, true);
    e.builder.set_flag(crate::flags::Flag::Carry, cf);
    e.builder.set_flag(crate::flags::Flag::Overflow, of);
    e.builder.set_flag(crate::flags::Flag::Zero, zf);
    e.builder.set_flag(crate::flags::Flag::Sign, sf);
    e.builder.set_flag(crate::flags::Flag::Parity, pf);
    e.builder.set_flag(crate::flags::Flag::Auxiliary, af);
}

fn write_sub_flags<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, lhs: crate::value::ValueId, rhs: crate::value::ValueId, result: crate::value::ValueId, width: Width) {
    let (cf, of) = sub_carry_overflow(&mut e.builder, lhs, rhs, result, width);
    let (zf, sf, pf) = zf_sf_pf(&mut e.builder, result, width);
    let af = aux_carry(&mut e.builder, lhs, rhs, width, false);
    e.builder.set_flag(crate::flags::Flag::Carry, cf);
    e.builder.set_flag(crate::flags::Flag::Overflow, of);
    e.builder.set_flag(crate::flags::Flag::Zero, zf);
    e.builder.set_flag(crate::flags::Flag::Sign, sf);
    e.builder.set_flag(crate::flags::Flag::Parity, pf);
    e.builder.set_flag(crate::flags::Flag::Auxiliary, af);
}

fn subr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, dst: Register, rhs_val: crate::value::ValueId, eflags_idx: usize, ops: &Operands<'_>) {
    ops.eflags(eflags_idx);
    let width = dst.width();
    let lhs = get_reg_val(&mut e.builder, dst);
    let result = e.builder.emit(InstKind::BinOp { op: BinOp::Sub, lhs, rhs: rhs_val });
    store_reg_val(&mut e.builder, dst, result);
    write_sub_flags(e, lhs, rhs_val, result, width);
}

pub fn add32rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let src = ops.reg(2);
    let rhs = get_reg_val(&mut e.builder, src);
    addr(e, dst, rhs, 3, &ops);
}

pub fn add64rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    add32rr(e, inst)
}

pub fn add32ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W8, Width::W32);
    addr(e, dst, rhs, 3, &ops);
}

pub fn add64ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W8, Width::W64);
    addr(e, dst, rhs, 3, &ops);
}

pub fn add64ri32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W32, Width::W64);
    addr(e, dst, rhs, 3, &ops);
}

/// `*64i32`'s reordered accumulator-form encoding: the immediate at operand
/// 0, the defined register at operand 1, EFLAGS at operand 2, and the used
/// register (must equal operand 1) at operand 3 (spec §4.4).
pub fn add64i32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let imm = ops.imm(0);
    let dst = ops.same_reg(1, 3);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W32, Width::W64);
    addr(e, dst, rhs, 2, &ops);
}

pub fn sub32rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let src = ops.reg(2);
    let rhs = get_reg_val(&mut e.builder, src);
    subr(e, dst, rhs, 3, &ops);
}

pub fn sub64rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    sub32rr(e, inst)
}

pub fn sub32ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W8, Width::W32);
    subr(e, dst, rhs, 3, &ops);
}

pub fn sub64ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W8, Width::W64);
    subr(e, dst, rhs, 3, &ops);
}

pub fn sub64ri32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W32, Width::W64);
    subr(e, dst, rhs, 3, &ops);
}

/// `*64i32`'s reordered accumulator-form encoding (see `add64i32`).
pub fn sub64i32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let imm = ops.imm(0);
    let dst = ops.same_reg(1, 3);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W32, Width::W64);
    subr(e, dst, rhs, 2, &ops);
}
