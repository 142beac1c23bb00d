//! Shift (SAR/SHR) and bitwise (AND/OR/XOR/NEG) families. Grounded on
//! `IREmitter-ADD.cpp`'s sibling flag-writing shape, generalized per spec
//! §4.3: shifts write `CF`/`OF`/`ZF`/`SF`/`PF` from the shift formulas;
//! AND/OR/XOR clear `CF`/`OF` and write `ZF`/`SF`/`PF` from the result;
//! `NEG32r` writes only `CF` (see `DESIGN.md`).

use crate::collab::{DecompilerContext, Disassembler};
use crate::dispatcher::Emitter;
use crate::flags::{literal_false, neg_carry, shift_carry, shift_overflow, zf_sf_pf, Flag};
use crate::helpers::{get_imm_val, get_reg_val, store_reg_val};
use crate::ir::{BinOp, InstKind};
use crate::operand::{Instruction, Operands};
use crate::reg::Register;
use crate::value::Width;

fn shift<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, dst: Register, amount: crate::value::ValueId, op: BinOp, ops: &Operands<'_>, eflags_idx: usize) {
    ops.eflags(eflags_idx);
    let width = dst.width();
    let lhs = get_reg_val(&mut e.builder, dst);
    let result = e.builder.emit(InstKind::BinOp { op, lhs, rhs: amount });
    store_reg_val(&mut e.builder, dst, result);
    let cf = shift_carry(&mut e.builder, lhs, amount, width);
    let of = shift_overflow(&mut e.builder, lhs, result, width);
    let (zf, sf, pf) = zf_sf_pf(&mut e.builder, result, width);
    e.builder.set_flag(Flag::Carry, cf);
    e.builder.set_flag(Flag::Overflow, of);
    e.builder.set_flag(Flag::Zero, zf);
    e.builder.set_flag(Flag::Sign, sf);
    e.builder.set_flag(Flag::Parity, pf);
}

pub fn sar64r1<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let dst = ops.same_reg(0, 1);
    let one = e.builder.emit(InstKind::ConstInt { value: 1, width: Width::W64 });
    shift(e, dst, one, BinOp::Sar, &ops, 2);
}

pub fn sar64ri<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let amount = get_imm_val(&mut e.builder, imm, Width::W8, Width::W64);
    shift(e, dst, amount, BinOp::Sar, &ops, 3);
}

pub fn shr64ri<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let amount = get_imm_val(&mut e.builder, imm, Width::W8, Width::W64);
    shift(e, dst, amount, BinOp::Shr, &ops, 3);
}

fn bitwise<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, dst: Register, rhs: crate::value::ValueId, op: BinOp, ops: &Operands<'_>, eflags_idx: usize) {
    ops.eflags(eflags_idx);
    let width = dst.width();
    let lhs = get_reg_val(&mut e.builder, dst);
    let result = e.builder.emit(InstKind::BinOp { op, lhs, rhs });
    store_reg_val(&mut e.builder, dst, result);
    let (zf, sf, pf) = zf_sf_pf(&mut e.builder, result, width);
    let zero = literal_false(&mut e.builder);
    e.builder.set_flag(Flag::Carry, zero);
    e.builder.set_flag(Flag::Overflow, zero);
    e.builder.set_flag(Flag::Zero, zf);
    e.builder.set_flag(Flag::Sign, sf);
    e.builder.set_flag(Flag::Parity, pf);
}

pub fn and64ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W8, Width::W64);
    bitwise(e, dst, rhs, BinOp::And, &ops, 3);
}

/// `*64i32`'s reordered accumulator-form encoding (see `arith::add64i32`).
pub fn and32i32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let imm = ops.imm(0);
    let dst = ops.same_reg(1, 3);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W32, Width::W32);
    bitwise(e, dst, rhs, BinOp::And, &ops, 2);
}

pub fn or64ri8<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let imm = ops.imm(2);
    let rhs = get_imm_val(&mut e.builder, imm, Width::W8, Width::W64);
    bitwise(e, dst, rhs, BinOp::Or, &ops, 3);
}

pub fn xor32rr<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 4);
    let dst = ops.same_reg(0, 1);
    let src = ops.reg(2);
    let rhs = get_reg_val(&mut e.builder, src);
    bitwise(e, dst, rhs, BinOp::Xor, &ops, 3);
}

/// `NEG` writes only `CF` (spec §4.3's minimal reading; see `DESIGN.md`
/// Open Question). The other five flag cells are left untouched rather than
/// written with a placeholder value.
pub fn neg32r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 3);
    let dst = ops.same_reg(0, 1);
    ops.eflags(2);
    let width = dst.width();
    let src = get_reg_val(&mut e.builder, dst);
    let result = e.builder.emit(InstKind::Neg { src });
    store_reg_val(&mut e.builder, dst, result);
    let cf = neg_carry(&mut e.builder, src, width);
    e.builder.set_flag(Flag::Carry, cf);
}
