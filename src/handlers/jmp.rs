//! Unconditional jumps. Direct jumps resolve to a plain `Br`; the indirect
//! register form has no statically known target, so per the recorded Open
//! Question decision (`DESIGN.md`) it terminates the block as
//! [`Terminator::Unreachable`] rather than guessing (spec §7).

use crate::collab::{DecompilerContext, Disassembler};
use crate::dispatcher::Emitter;
use crate::helpers::get_reg_val;
use crate::ir::Terminator;
use crate::operand::{Instruction, Operands};

pub fn jmp<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 1);
    let disp = ops.imm(0);
    let target = e.target_address(inst, disp);
    let bb = e.builder.get_or_create_basic_block(&format!("bb_{target}"));
    e.builder.terminate(Terminator::Br(bb));
}

pub fn jmp64r<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    let ops = Operands::new(inst.opcode, &inst.operands, 1);
    let _ = get_reg_val(&mut e.builder, ops.reg(0));
    e.builder.terminate(Terminator::Unreachable);
}
