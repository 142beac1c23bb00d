//! Conditional branches. Grounded on `IREmitter-Jcc.cpp`: each mnemonic is a
//! boolean formula over the flag cells feeding a shared `CondBr` shape, with
//! both arms always resolved since direct branches carry their own target
//! displacement (spec §4.4).

use crate::collab::{DecompilerContext, Disassembler};
use crate::dispatcher::Emitter;
use crate::flags::Flag;
use crate::ir::{ICmpPred, InstKind, Terminator};
use crate::operand::{Instruction, Operands};
use crate::value::ValueId;

fn not<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, v: ValueId) -> ValueId {
    let f = e.builder.emit(InstKind::ConstBool(false));
    e.builder.emit(InstKind::ICmp { pred: ICmpPred::Eq, lhs: v, rhs: f })
}

fn eq<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, a: ValueId, b: ValueId) -> ValueId {
    e.builder.emit(InstKind::ICmp { pred: ICmpPred::Eq, lhs: a, rhs: b })
}

fn ne<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, a: ValueId, b: ValueId) -> ValueId {
    e.builder.emit(InstKind::ICmp { pred: ICmpPred::Ne, lhs: a, rhs: b })
}

fn and<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, a: ValueId, b: ValueId) -> ValueId {
    e.builder.emit(InstKind::BoolAnd { lhs: a, rhs: b })
}

fn or<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, a: ValueId, b: ValueId) -> ValueId {
    e.builder.emit(InstKind::BoolOr { lhs: a, rhs: b })
}

/// Branch on `cond`, resolving both arms from `inst`'s displacement operand
/// and the instruction's own fallthrough (spec §4.4).
fn cond_branch<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction, cond: ValueId) {
    let ops = Operands::new(inst.opcode, &inst.operands, 2);
    ops.eflags(1);
    let disp = ops.imm(0);
    let target = e.target_address(inst, disp);
    let fallthrough = e.fallthrough_address(inst);
    let then_bb = e.builder.get_or_create_basic_block(&format!("bb_{target}"));
    let else_bb = e.builder.get_or_create_basic_block(&format!("bb_{fallthrough}"));
    e.builder.terminate(Terminator::CondBr { cond, then_bb, else_bb });
}

pub fn ja<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let cf = e.builder.flag_val(Flag::Carry);
    let zf = e.builder.flag_val(Flag::Zero);
    let not_cf = not(e, cf);
    let not_zf = not(e, zf);
    let cond = and(e, not_cf, not_zf);
    cond_branch(e, inst, cond);
}

pub fn jae<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let cf = e.builder.flag_val(Flag::Carry);
    let cond = not(e, cf);
    cond_branch(e, inst, cond);
}

pub fn jb<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let cf = e.builder.flag_val(Flag::Carry);
    let t = e.builder.emit(InstKind::ConstBool(true));
    let cond = eq(e, cf, t);
    cond_branch(e, inst, cond);
}

pub fn jbe<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let cf = e.builder.flag_val(Flag::Carry);
    let zf = e.builder.flag_val(Flag::Zero);
    let cond = or(e, cf, zf);
    cond_branch(e, inst, cond);
}

pub fn je<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let zf = e.builder.flag_val(Flag::Zero);
    let t = e.builder.emit(InstKind::ConstBool(true));
    let cond = eq(e, zf, t);
    cond_branch(e, inst, cond);
}

pub fn jne<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let zf = e.builder.flag_val(Flag::Zero);
    let cond = not(e, zf);
    cond_branch(e, inst, cond);
}

pub fn jg<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let zf = e.builder.flag_val(Flag::Zero);
    let sf = e.builder.flag_val(Flag::Sign);
    let of = e.builder.flag_val(Flag::Overflow);
    let not_zf = not(e, zf);
    let sf_eq_of = eq(e, sf, of);
    let cond = and(e, not_zf, sf_eq_of);
    cond_branch(e, inst, cond);
}

pub fn jge<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let sf = e.builder.flag_val(Flag::Sign);
    let of = e.builder.flag_val(Flag::Overflow);
    let cond = eq(e, sf, of);
    cond_branch(e, inst, cond);
}

pub fn jl<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let sf = e.builder.flag_val(Flag::Sign);
    let of = e.builder.flag_val(Flag::Overflow);
    let cond = ne(e, sf, of);
    cond_branch(e, inst, cond);
}

pub fn jle<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let zf = e.builder.flag_val(Flag::Zero);
    let sf = e.builder.flag_val(Flag::Sign);
    let of = e.builder.flag_val(Flag::Overflow);
    let sf_ne_of = ne(e, sf, of);
    let t = e.builder.emit(InstKind::ConstBool(true));
    let zf_set = eq(e, zf, t);
    let cond = or(e, zf_set, sf_ne_of);
    cond_branch(e, inst, cond);
}

pub fn jno<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let of = e.builder.flag_val(Flag::Overflow);
    let cond = not(e, of);
    cond_branch(e, inst, cond);
}

pub fn jo<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let of = e.builder.flag_val(Flag::Overflow);
    let t = e.builder.emit(InstKind::ConstBool(true));
    let cond = eq(e, of, t);
    cond_branch(e, inst, cond);
}

pub fn jnp<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let pf = e.builder.flag_val(Flag::Parity);
    let cond = not(e, pf);
    cond_branch(e, inst, cond);
}

pub fn jp<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let pf = e.builder.flag_val(Flag::Parity);
    let t = e.builder.emit(InstKind::ConstBool(true));
    let cond = eq(e, pf, t);
    cond_branch(e, inst, cond);
}

pub fn jns<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let sf = e.builder.flag_val(Flag::Sign);
    let cond = not(e, sf);
    cond_branch(e, inst, cond);
}

pub fn js<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let sf = e.builder.flag_val(Flag::Sign);
    let t = e.builder.emit(InstKind::ConstBool(true));
    let cond = eq(e, sf, t);
    cond_branch(e, inst, cond);
}
