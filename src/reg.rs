//! Register identifiers and the backing file of canonical register storage.
//!
//! x86-64's sub-register aliasing is irregular: writing a 32-bit sub-register
//! zero-extends into the full 64-bit register, writing a 16-bit or 8-bit
//! sub-register merges into the existing bits, and the legacy `AH`/`BH`/`CH`/
//! `DH` high-byte registers alias bits 8-15 of their 32-bit parent rather than
//! bits 0-7. [`Register`] carries that metadata directly so [`crate::helpers`]
//! never special-cases it.

use std::fmt;
use strum::EnumIter;

use crate::value::{ValueId, Width};

/// A canonical (always 64-bit-backed) register identity. Every [`Register`]
/// variant aliases storage for exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Canonical {
    Rax,
    Rbx,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    Rbp,
    Rsp,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    /// Instruction pointer. Not general-purpose; addressed the same way so
    /// the dispatcher's RIP pre-update (spec §4.5) can route through the
    /// same register file as everything else.
    Rip,
}

impl Canonical {
    /// Name this canonical register's pseudo-storage cell is keyed by in
    /// [`crate::ir::InstKind::ReadReg`].
    pub const fn name(self) -> &'static str {
        match self {
            Canonical::Rax => "rax",
            Canonical::Rbx => "rbx",
            Canonical::Rcx => "rcx",
            Canonical::Rdx => "rdx",
            Canonical::Rsi => "rsi",
            Canonical::Rdi => "rdi",
            Canonical::Rbp => "rbp",
            Canonical::Rsp => "rsp",
            Canonical::R8 => "r8",
            Canonical::R9 => "r9",
            Canonical::R10 => "r10",
            Canonical::R11 => "r11",
            Canonical::R12 => "r12",
            Canonical::R13 => "r13",
            Canonical::R14 => "r14",
            Canonical::R15 => "r15",
            Canonical::Rip => "rip",
        }
    }

    /// Stable index into [`RegisterFile`]'s backing array.
    const fn index(self) -> usize {
        match self {
            Canonical::Rax => 0,
            Canonical::Rbx => 1,
            Canonical::Rcx => 2,
            Canonical::Rdx => 3,
            Canonical::Rsi => 4,
            Canonical::Rdi => 5,
            Canonical::Rbp => 6,
            Canonical::Rsp => 7,
            Canonical::R8 => 8,
            Canonical::R9 => 9,
            Canonical::R10 => 10,
            Canonical::R11 => 11,
            Canonical::R12 => 12,
            Canonical::R13 => 13,
            Canonical::R14 => 14,
            Canonical::R15 => 15,
            Canonical::Rip => 16,
        }
    }
}

/// Number of canonical 64-bit register slots, including `RIP`.
pub const CANONICAL_COUNT: usize = 17;

/// A register as it appears in a decoded operand: a canonical register at
/// one of its valid access widths (plus the high-byte legacy aliases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Full 64-bit access, e.g. `RAX`.
    Full(Canonical),
    /// Low 32 bits, e.g. `EAX`. A write here zero-extends into the full
    /// register (spec §4.2 "32-bit write zero-extension rule").
    Low32(Canonical),
    /// Low 16 bits, e.g. `AX`. A write here merges with the existing high
    /// bits (spec §4.2 "8/16-bit write merge rule").
    Low16(Canonical),
    /// Low 8 bits, e.g. `AL`. Merges on write.
    Low8(Canonical),
    /// Legacy high byte of the low 16 bits, e.g. `AH`. Only defined for the
    /// four registers that have one (`RAX`, `RBX`, `RCX`, `RDX`). Merges on
    /// write, like `Low8`, but at bit offset 8 instead of 0.
    High8(Canonical),
}

impl Register {
    /// The canonical 64-bit register this access aliases into.
    pub const fn canonical(self) -> Canonical {
        match self {
            Register::Full(c) | Register::Low32(c) | Register::Low16(c) | Register::Low8(c) | Register::High8(c) => c,
        }
    }

    /// Access width of this register operand.
    pub const fn width(self) -> Width {
        match self {
            Register::Full(_) => Width::W64,
            Register::Low32(_) => Width::W32,
            Register::Low16(_) => Width::W16,
            Register::Low8(_) | Register::High8(_) => Width::W8,
        }
    }

    /// Bit offset of this access within the canonical 64-bit register.
    pub const fn bit_offset(self) -> u32 {
        match self {
            Register::High8(_) => 8,
            _ => 0,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Canonical::*;
        let name = match (*self, self.canonical()) {
            (Register::Full(_), Rax) => "rax",
            (Register::Full(_), Rbx) => "rbx",
            (Register::Full(_), Rcx) => "rcx",
            (Register::Full(_), Rdx) => "rdx",
            (Register::Full(_), Rsi) => "rsi",
            (Register::Full(_), Rdi) => "rdi",
            (Register::Full(_), Rbp) => "rbp",
            (Register::Full(_), Rsp) => "rsp",
            (Register::Full(_), R8) => "r8",
            (Register::Full(_), R9) => "r9",
            (Register::Full(_), R10) => "r10",
            (Register::Full(_), R11) => "r11",
            (Register::Full(_), R12) => "r12",
            (Register::Full(_), R13) => "r13",
            (Register::Full(_), R14) => "r14",
            (Register::Full(_), R15) => "r15",
            (Register::Full(_), Rip) => "rip",
            (Register::Low32(_), Rax) => "eax",
            (Register::Low32(_), Rbx) => "ebx",
            (Register::Low32(_), Rcx) => "ecx",
            (Register::Low32(_), Rdx) => "edx",
            (Register::Low32(_), Rsi) => "esi",
            (Register::Low32(_), Rdi) => "edi",
            (Register::Low32(_), Rbp) => "ebp",
            (Register::Low32(_), Rsp) => "esp",
            (Register::Low16(_), Rax) => "ax",
            (Register::Low16(_), Rbx) => "bx",
            (Register::Low16(_), Rcx) => "cx",
            (Register::Low16(_), Rdx) => "dx",
            (Register::Low8(_), Rax) => "al",
            (Register::Low8(_), Rbx) => "bl",
            (Register::Low8(_), Rcx) => "cl",
            (Register::Low8(_), Rdx) => "dl",
            (Register::High8(_), Rax) => "ah",
            (Register::High8(_), Rbx) => "bh",
            (Register::High8(_), Rcx) => "ch",
            (Register::High8(_), Rdx) => "dh",
            _ => "r?",
        };
        f.write_str(name)
    }
}

/// Tracks, per canonical register, the SSA value currently bound to it —
/// the reaching definition [`crate::helpers::get_reg_val`] reads and
/// [`crate::helpers::store_reg_val`] updates. Owned per-function (spec §5:
/// "per-module, not process-global" state), not per-process: two functions
/// being lifted concurrently never share one.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    slots: [Option<ValueId>; CANONICAL_COUNT],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            slots: [None; CANONICAL_COUNT],
        }
    }
}

impl RegisterFile {
    /// The value currently bound to `reg`'s full 64 bits, if it has been
    /// written since the function started lifting.
    pub fn current(&self, reg: Canonical) -> Option<ValueId> {
        self.slots[reg.index()]
    }

    /// Rebind `reg`'s full 64 bits to `value`.
    pub fn set_current(&mut self, reg: Canonical, value: ValueId) {
        self.slots[reg.index()] = Some(value);
    }
}
