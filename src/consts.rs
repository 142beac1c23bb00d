//! Architecture width constants

/// Byte width of a general-purpose register in 64-bit mode.
pub const WORD_SIZE: usize = 8;

/// Bit width of a general-purpose register in 64-bit mode.
pub const WORD_BITS: u32 = 64;

/// Number of memory-operand components `(base, scale, index, disp, seg)`
/// read by every handler that touches a memory operand.
pub const MEM_OPERAND_GROUP_WIDTH: usize = 5;

/// Byte width pushed/popped by `PUSH64r`/`POP64r`/`CALL`/`RET`.
pub const STACK_SLOT_BYTES: u64 = 8;
