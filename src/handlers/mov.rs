//! MOV/LEA family. Grounded on `IREmitter-MOV.cpp` and `IREmitter-LEA.cpp`:
//! plain data movement between registers, memory and immediates, plus LEA's
//! address-only computation with no memory access.

use crate::collab::{DecompilerContext, Disassembler};
use crate::dispatcher::Emitter;
use crate::helpers::{get_imm_val, get_mem_val, get_reg_val, get_pointer_val, store_mem_val, store_reg_val};
use crate::operand::{Instruction, Operands};
use crate::value::Width;

pub fn mov32r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 2);
    let dst = ops.reg(0);
    let src = ops.reg(1);
    let val = get_reg_val(&mut e.builder, src);
    store_reg_val(&mut e.builder, dst, val);
}

pub fn mov64r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    mov32r(e, inst)
}

pub fn mov64ri32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 2);
    let dst = ops.reg(0);
    let imm = ops.imm(1);
    let val = get_imm_val(&mut e.builder, imm, Width::W32, Width::W64);
    store_reg_val(&mut e.builder, dst, val);
}

pub fn mov32rm<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 6);
    let dst = ops.reg(0);
    let mem = ops.mem_group(1);
    let val = get_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, Width::W32);
    store_reg_val(&mut e.builder, dst, val);
}

pub fn mov64rm<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 6);
    let dst = ops.reg(0);
    let mem = ops.mem_group(1);
    let val = get_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, Width::W64);
    store_reg_val(&mut e.builder, dst, val);
}

fn store_mem_family<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction, width: Width) {
    let ops = Operands::new(inst.opcode, &inst.operands, 6);
    let mem = ops.mem_group(0);
    let src = ops.reg(5);
    let val = get_reg_val(&mut e.builder, src);
    let val = match width {
        Width::W64 => val,
        _ => e.builder.emit(crate::ir::InstKind::Trunc { src: val, width }),
    };
    store_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, val);
}

pub fn mov8m<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    store_mem_family(e, inst, Width::W8)
}

pub fn mov32m<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    store_mem_family(e, inst, Width::W32)
}

pub fn mov64m<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    store_mem_family(e, inst, Width::W64)
}

pub fn mov64mi32<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 6);
    let mem = ops.mem_group(0);
    let imm = ops.imm(5);
    let val = get_imm_val(&mut e.builder, imm, Width::W32, Width::W64);
    store_mem_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment, val);
}

/// LEA computes the effective address itself, never dereferencing it (spec
/// §4.4: "LEA never emits `Load`").
pub fn lea64r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 6);
    let dst = ops.reg(0);
    let mem = ops.mem_group(1);
    let addr = get_pointer_val(&mut e.builder, mem.base, mem.scale, mem.index, mem.disp, mem.segment);
    store_reg_val(&mut e.builder, dst, addr);
}
