//! The supported x86-64 opcode space (spec §6 instruction support matrix).
//!
//! Kept as a closed enum rather than a runtime opcode->handler map: per
//! spec §9's design note, an exhaustive `match` over this type lets the
//! compiler prove every supported opcode dispatches somewhere, which
//! statically eliminates the "unknown opcode" error class for anything
//! that reaches [`crate::dispatcher::Emitter::lift`] — mapping raw decoded
//! bytes onto one of these variants (or rejecting an unsupported encoding)
//! is the external disassembler collaborator's job (spec §1 Non-goals).

use strum::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Opcode {
    Mov32r,
    Mov32rm,
    Mov64r,
    Mov64ri32,
    Mov8m,
    Mov32m,
    Mov64m,
    Mov64mi32,
    Mov64rm,
    Lea64r,

    Add32rr,
    Add64rr,
    Add32ri8,
    Add64ri8,
    Add64ri32,
    Add64i32,

    Sub32rr,
    Sub64rr,
    Sub32ri8,
    Sub64ri8,
    Sub64ri32,
    Sub64i32,

    Sar64r1,
    Sar64ri,
    Shr64ri,
    And64ri8,
    And32i32,
    Or64ri8,
    Xor32rr,
    Neg32r,

    Cmp32ri8,
    Cmp64ri8,
    Cmp64i32,
    Cmp64rr,
    Cmp32mi8,
    Cmp64mi8,
    Cmp8mi,
    Cmp64rm,

    Test32rr,
    Test64rr,
    Test32ri8,
    Test64ri8,
    Test32mi8,
    Test64mi8,
    Test64rm,

    Ja,
    Jae,
    Jb,
    Jbe,
    Je,
    Jg,
    Jge,
    Jl,
    Jle,
    Jne,
    Jno,
    Jnp,
    Jns,
    Jo,
    Jp,
    Js,

    Jmp,
    Jmp64pcrel32,
    Jmp64r,

    Call64pcrel32,
    Call64r,
    Call64m,
    Ret,

    Push64r,
    Pop64r,
    Leave64,

    Noop,
    Noopl,
    Noopw,
    RepPrefix,
    Hlt,

    Syscall,
}
