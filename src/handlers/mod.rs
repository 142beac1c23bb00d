//! Instruction Handlers (spec §4.4): one function per supported opcode,
//! grouped by instruction family the way `original_source/lib/CodeInv`
//! splits `IREmitter-*.cpp` per mnemonic family. Each handler destructures
//! its instruction's operands against the schema its opcode expects via
//! [`crate::operand::Operands`], then composes [`crate::helpers`] and
//! [`crate::flags`] to emit IR.

pub mod arith;
pub mod call;
pub mod cmp;
pub mod jcc;
pub mod jmp;
pub mod logic;
pub mod mov;
pub mod special;
pub mod stack;
