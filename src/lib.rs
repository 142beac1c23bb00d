//! x86-64 instruction lifting core for a machine-code decompiler: turns
//! already-decoded x86-64 instructions into a typed, SSA-style IR a
//! downstream decompiler pipeline consumes.
//!
//! Binary loading, disassembly, global CFG recovery and PLT symbol-table
//! parsing are all out of scope (spec §1 Non-goals) and instead named as
//! collaborator traits in [`collab`]; this crate's only job is the
//! per-instruction lifting step, exposed through [`dispatcher::Emitter`].

pub mod collab;
pub mod consts;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod flags;
pub mod handlers;
pub mod helpers;
pub mod ir;
pub mod opcode;
pub mod operand;
pub mod reg;
pub mod value;

/// The common entry points most callers need: the [`Emitter`], the decoded
/// [`Instruction`]/[`Operand`] shapes, the [`Opcode`] matrix, the IR types,
/// and the collaborator traits an embedder implements.
///
/// [`Emitter`]: dispatcher::Emitter
/// [`Instruction`]: operand::Instruction
/// [`Operand`]: operand::Operand
/// [`Opcode`]: opcode::Opcode
pub mod prelude {
    pub use crate::collab::{DecompilerContext, Disassembler, FunctionRef, SectionKind};
    pub use crate::dispatcher::Emitter;
    pub use crate::error::CollabError;
    pub use crate::ir::{BasicBlock, BinOp, BlockId, Function, ICmpPred, Inst, InstKind, Module, Terminator};
    pub use crate::opcode::Opcode;
    pub use crate::operand::{Instruction, MemGroup, Operand, Operands};
    pub use crate::reg::{Canonical, Register};
    pub use crate::value::{ValueId, Width};
}
