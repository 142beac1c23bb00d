//! CMP/TEST families. Both compute a result without writing a destination;
//! CMP feeds the SUB flag formulas, TEST feeds AND with `CF`/`OF` cleared
//! (spec §4.3). Grounded on `IREmitter-ADD.cpp`'s flag-writing shape, the
//! non-writing half of it.

use crate::collab::{DecompilerContext, Disassembler};
use crate::dispatcher::Emitter;
use crate::flags::{aux_carry, literal_false, sub_carry_overflow, zf_sf_pf, Flag};
use crate::helpers::{get_imm_val, get_mem_val, get_reg_val};
use crate::ir::{BinOp, InstKind};
use crate::operand::{Instruction, Operands};
use crate::value::{ValueId, Width};

fn cmp<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, lhs: ValueId, rhs: ValueId, width: Width, ops: &Operands<'_>, eflags_idx: usize) {
    ops.eflags(eflags_idx);
    let result = e.builder.emit(InstKind::BinOp { op: BinOp::Sub, lhs, rhs });
    let (cf, of) = sub_carry_overflow(&mut e.builder, lhs, rhs, result, width);
    let (zf, sf, pf) = zf_sf_pf(&mut e.builder, result, width);
    let af = aux_carry(&mut e.builder, lhs, rhs, width, false);
    e.builder.set_flag(Flag::Carry, cf);
    e.builder.set_flag(Flag::Overflow, of);
    e.builder.set_flag(Flag::Zero, zf);
    e.builder.set_flag(Flag::Sign, sf);
    e.builder.set_flag(Flag::Parity, pf);
    e.builder.set_flag(Flag::Auxiliary, af);
}

pub fn cmp32ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let lhs_reg = ops.reg(0);
    let lhs = get_reg_val(&mut e.builder, lhs_reg);
    let rhs = get_imm_val(&mut e.builder, ops.imm(1), Width::W8, Width::W32);
    cmp(e, lhs, rhs, Width::W32, &ops, 2);
}

pub fn cmp64ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let lhs_reg = ops.reg(0);
    let lhs = get_reg_val(&mut e.builder, lhs_reg);
    let rhs = get_imm_val(&mut e.builder, ops.imm(1), Width::W8, Width::W64);
    cmp(e, lhs, rhs, Width::W64, &ops, 2);
}

/// `*64i32`'s reordered accumulator-form encoding (see `arith::add64i32`).
pub fn cmp64i32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let lhs_reg = ops.same_reg(1, 3);
    let lhs = get_reg_val(&mut e.builder, lhs_reg);
    let rhs = get_imm_val(&mut e.builder, ops.imm(0), Width::W32, Width::W64);
    cmp(e, lhs, rhs, Width::W64, &ops, 2);
}

pub fn cmp64rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let lhs = get_reg_val(&mut e.builder, ops.reg(0));
    let rhs = get_reg_val(&mut e.builder, ops.reg(1));
    cmp(e, lhs, rhs, Width::W64, &ops, 2);
}

fn cmp_mi<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction, width: Width) {
    let ops = Operands::new(inst.opcode, &inst.operands, 7);
    let mem = ops.mem_group(0);
    let lhs = get_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, width);
    let rhs = get_imm_val(&mut e.builder, ops.imm(5), Width::W8, width);
    cmp(e, lhs, rhs, width, &ops, 6);
}

pub fn cmp32mi8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    cmp_mi(e, inst, Width::W32)
}

pub fn cmp64mi8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    cmp_mi(e, inst, Width::W64)
}

pub fn cmp8mi<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    cmp_mi(e, inst, Width::W8)
}

pub fn cmp64rm<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 7);
    let lhs = get_reg_val(&mut e.builder, ops.reg(0));
    let mem = ops.mem_group(1);
    let rhs = get_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, Width::W64);
    cmp(e, lhs, rhs, Width::W64, &ops, 6);
}

/// `AF` is undefined after `TEST` on real hardware; this core leaves it
/// unwritten rather than inventing a value for it (spec §9 SUPPLEMENT
/// C.5's TEST family note).
fn test<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, lhs: ValueId, rhs: ValueId, width: Width, ops: &Operands<'_>, eflags_idx: usize) {
    ops.eflags(eflags_idx);
    let result = e.builder.emit(InstKind::BinOp { op: BinOp::And, lhs, rhs });
    let (zf, sf, pf) = zf_sf_pf(&mut e.builder, result, width);
    let zero = literal_false(&mut e.builder);
    e.builder.set_flag(Flag::Carry, zero);
    e.builder.set_flag(Flag::Overflow, zero);
    e.builder.set_flag(Flag::Zero, zf);
    e.builder.set_flag(Flag::Sign, sf);
    e.builder.set_flag(Flag::Parity, pf);
}

pub fn test32rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let lhs = get_reg_val(&mut e.builder, ops.reg(0));
    let rhs = get_reg_val(&mut e.builder, ops.reg(1));
    test(e, lhs, rhs, Width::W32, &ops, 2);
}

pub fn test64rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let lhs = get_reg_val(&mut e.builder, ops.reg(0));
    let rhs = get_reg_val(&mut e.builder, ops.reg(1));
    test(e, lhs, rhs, Width::W64, &ops, 2);
}

pub fn test32ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let lhs = get_reg_val(&mut e.builder, ops.reg(0));
    let rhs = get_imm_val(&mut e.builder, ops.imm(1), Width::W8, Width::W32);
    test(e, lhs, rhs, Width::W32, &ops, 2);
}

pub fn test64ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let lhs = get_reg_val(&mut e.builder, ops.reg(0));
    let rhs = get_imm_val(&mut e.builder, ops.imm(1), Width::W8, Width::W64);
    test(e, lhs, rhs, Width::W64, &ops, 2);
}

fn test_mi<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction, width: Width) {
    let ops = Operands::new(inst.opcode, &inst.operands, 7);
    let mem = ops.mem_group(0);
    let lhs = get_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, width);
    let rhs = get_imm_val(&mut e.builder, ops.imm(5), Width::W8, width);
    test(e, lhs, rhs, width, &ops, 6);
}

pub fn test32mi8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    test_mi(e, inst, Width::W32)
}

pub fn test64mi8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    test_mi(e, inst, Width::W64)
}

pub fn test64rm<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 7);
    let lhs = get_reg_val(&mut e.builder, ops.reg(0));
    let mem = ops.mem_group(1);
    let rhs = get_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, Width::W64);
    test(e, lhs, rhs, Width::W64, &ops, 6);
}
