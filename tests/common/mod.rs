//! Fakes for the external collaborator traits (spec §6), shared across the
//! integration tests under `tests/`. A real embedder backs these with an
//! object-file loader and a disassembler; these tests only need enough to
//! drive the lifter end-to-end.

use std::collections::HashMap;
use std::ops::Range;

use x86_lift::prelude::*;

/// Flat-binary disassembler stand-in: `load_addr` is the identity (no
/// base-relocation math), matching spec §4.2's "currently identity for
/// flat addressing" note.
#[derive(Default)]
pub struct FakeDisassembler;

impl Disassembler for FakeDisassembler {
    fn load_addr(&self, offset: u64) -> u64 {
        offset
    }
}

/// A tiny decompiler-context fake: a fixed table of known function
/// addresses, a fixed table of PLT stub symbols, and one contiguous range
/// standing in for the `.plt` section.
#[derive(Default)]
pub struct FakeDecompiler {
    pub functions: HashMap<u64, String>,
    pub plt_symbols: HashMap<u64, String>,
    pub plt_range: Range<u64>,
}

impl DecompilerContext for FakeDecompiler {
    fn function_by_addr(&self, address: u64) -> Option<FunctionRef> {
        self.functions.get(&address).cloned().map(FunctionRef)
    }

    fn section_containing(&self, address: u64) -> Result<SectionKind, CollabError> {
        if self.plt_range.contains(&address) {
            Ok(SectionKind::Plt)
        } else {
            Ok(SectionKind::Other)
        }
    }

    fn resolve_plt_symbol(&self, address: u64) -> Option<String> {
        self.plt_symbols.get(&address).cloned()
    }
}

pub fn reg(r: Register) -> Operand {
    Operand::Reg(r)
}

pub fn imm(v: i64) -> Operand {
    Operand::Imm(v)
}

pub fn eflags() -> Operand {
    Operand::Eflags
}

pub fn noreg() -> Operand {
    Operand::NoReg
}

pub fn full(c: Canonical) -> Register {
    Register::Full(c)
}

/// Build an [`Instruction`] at `address`/`size` with `operands`.
pub fn inst(opcode: Opcode, operands: Vec<Operand>, size: u64, address: u64) -> Instruction {
    Instruction::new(opcode, operands, size, address)
}
