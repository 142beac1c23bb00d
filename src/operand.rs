//! The decoded instruction shape this crate consumes, and the small
//! declarative cursor the Instruction Handlers use to destructure it
//! against each opcode's fixed operand schema (spec §4.1).
//!
//! Decoding from raw bytes into [`Instruction`] is the external
//! disassembler collaborator's job (spec §1 Non-goals); this module only
//! validates and destructures an already-decoded instruction.

use crate::opcode::Opcode;
use crate::reg::Register;

/// One positional operand of a decoded instruction (spec §3 "Operand").
///
/// Memory operands never appear as a single fused kind; they show up as
/// five consecutive operands of these same variants (`Reg`/`Imm`/`NoReg`),
/// which [`Operands::mem_group`] recognises by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A register operand.
    Reg(Register),
    /// A signed 64-bit immediate, as decoded (spec §3: "Immediate(signed
    /// 64-bit)").
    Imm(i64),
    /// Marks a position that must carry the EFLAGS pseudo-register, e.g.
    /// the implicit flags operand most flag-producing/consuming opcodes
    /// carry (spec glossary "EFLAGS").
    Eflags,
    /// The `NoRegister` sentinel (spec §3), used in a memory operand group
    /// when the index or segment term is absent.
    NoReg,
}

/// A decoded x86-64 machine instruction (spec §3 "Instruction (input)").
#[derive(Debug, Clone)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    /// Encoded size in bytes.
    pub size: u64,
    /// Section-relative source offset.
    pub address: u64,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>, size: u64, address: u64) -> Self {
        Self {
            opcode,
            operands,
            size,
            address,
        }
    }
}

/// The five positional operands of a memory addressing-mode group (spec
/// §4.1): `base + index*scale + disp`, with an (almost always flat/absent)
/// segment override.
#[derive(Debug, Clone, Copy)]
pub struct MemGroup {
    pub base: Option<Register>,
    pub scale: u8,
    pub index: Option<Register>,
    pub disp: i64,
    pub segment: Option<Register>,
}

/// A read-only cursor over one instruction's operands that destructures
/// them against an opcode's expected schema, panicking with a diagnostic
/// naming the opcode and offending position on any mismatch (spec §4.1,
/// §7 item 1: schema violations are fatal, never recovered).
pub struct Operands<'a> {
    opcode: Opcode,
    ops: &'a [Operand],
}

impl<'a> Operands<'a> {
    /// Bind a cursor over `ops`, asserting it carries exactly `expected`
    /// positional operands.
    pub fn new(opcode: Opcode, ops: &'a [Operand], expected: usize) -> Self {
        assert_eq!(
            ops.len(),
            expected,
            "{opcode:?}: expected {expected} operands, got {}",
            ops.len()
        );
        Self { opcode, ops }
    }

    /// Operand `i` as a register.
    pub fn reg(&self, i: usize) -> Register {
        match self.ops[i] {
            Operand::Reg(r) => r,
            _ => panic!("{:?}: operand {i} is not a register", self.opcode),
        }
    }

    /// Operand `i` as a register, or `None` if it's the `NoRegister`
    /// sentinel (only valid within a memory operand group).
    pub fn reg_opt(&self, i: usize) -> Option<Register> {
        match self.ops[i] {
            Operand::Reg(r) => Some(r),
            Operand::NoReg => None,
            _ => panic!("{:?}: operand {i} is not a register or NoRegister", self.opcode),
        }
    }

    /// Operand `i` as a signed immediate.
    pub fn imm(&self, i: usize) -> i64 {
        match self.ops[i] {
            Operand::Imm(v) => v,
            _ => panic!("{:?}: operand {i} is not an immediate", self.opcode),
        }
    }

    /// Operand `i` as a register or an immediate, for the handful of
    /// handlers whose rhs may be either (e.g. `XOR32rr`, `PUSH64r`,
    /// `CMP64rr`; spec §9 SUPPLEMENT C.5/C.7).
    pub fn reg_or_imm(&self, i: usize) -> Operand {
        match self.ops[i] {
            op @ (Operand::Reg(_) | Operand::Imm(_)) => op,
            _ => panic!("{:?}: operand {i} is not a register or immediate", self.opcode),
        }
    }

    /// Assert operand `i` carries the EFLAGS marker.
    pub fn eflags(&self, i: usize) {
        assert!(
            matches!(self.ops[i], Operand::Eflags),
            "{:?}: operand {i} is not EFLAGS",
            self.opcode
        );
    }

    /// Assert operand `i` is a register equal to `expected` (the
    /// fixed-register constraint, e.g. "must be RSP").
    pub fn fixed_reg(&self, i: usize, expected: Register) {
        let actual = self.reg(i);
        assert_eq!(
            actual, expected,
            "{:?}: operand {i} must be {expected:?}, got {actual:?}",
            self.opcode
        );
    }

    /// Assert operands `def` and `use_` carry the same register (the
    /// read-modify-write def=use constraint, spec §4.1) and return it.
    pub fn same_reg(&self, def: usize, use_: usize) -> Register {
        let defined = self.reg(def);
        let used = self.reg(use_);
        assert_eq!(
            defined, used,
            "{:?}: defined operand {def} ({defined:?}) and used operand {use_} ({used:?}) must be the same register",
            self.opcode
        );
        defined
    }

    /// Read the five consecutive operands starting at `start` as a memory
    /// operand group (spec §4.1, §9 SUPPLEMENT C.4: always 5-wide).
    pub fn mem_group(&self, start: usize) -> MemGroup {
        let base = self.reg_opt(start);
        let scale = match self.ops[start + 1] {
            Operand::Imm(v) if matches!(v, 1 | 2 | 4 | 8) => v as u8,
            Operand::Imm(v) => panic!("{:?}: scale {v} is not one of 1/2/4/8", self.opcode),
            _ => panic!("{:?}: operand {} is not the scale immediate", self.opcode, start + 1),
        };
        let index = self.reg_opt(start + 2);
        let disp = self.imm(start + 3);
        let segment = self.reg_opt(start + 4);
        MemGroup {
            base,
            scale,
            index,
            disp,
            segment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::Canonical;

    fn rax() -> Register {
        Register::Full(Canonical::Rax)
    }

    fn rbx() -> Register {
        Register::Full(Canonical::Rbx)
    }

    #[test]
    #[should_panic(expected = "expected 2 operands, got 1")]
    fn wrong_operand_count_panics() {
        let ops = [Operand::Reg(rax())];
        Operands::new(Opcode::Mov32r, &ops, 2);
    }

    #[test]
    #[should_panic(expected = "is not a register")]
    fn reg_on_an_immediate_operand_panics() {
        let ops = [Operand::Imm(1), Operand::Imm(2)];
        let cursor = Operands::new(Opcode::Mov32r, &ops, 2);
        cursor.reg(0);
    }

    #[test]
    #[should_panic(expected = "is not EFLAGS")]
    fn eflags_on_a_non_eflags_operand_panics() {
        let ops = [Operand::Reg(rax())];
        let cursor = Operands::new(Opcode::Add32rr, &ops, 1);
        cursor.eflags(0);
    }

    #[test]
    #[should_panic(expected = "must be")]
    fn fixed_reg_mismatch_panics() {
        let ops = [Operand::Reg(rax())];
        let cursor = Operands::new(Opcode::Push64r, &ops, 1);
        cursor.fixed_reg(0, rbx());
    }

    #[test]
    #[should_panic(expected = "must be the same register")]
    fn same_reg_mismatch_panics() {
        let ops = [Operand::Reg(rax()), Operand::Reg(rbx())];
        let cursor = Operands::new(Opcode::Add32rr, &ops, 2);
        cursor.same_reg(0, 1);
    }

    #[test]
    fn same_reg_match_returns_the_shared_register() {
        let ops = [Operand::Reg(rax()), Operand::Reg(rax())];
        let cursor = Operands::new(Opcode::Add32rr, &ops, 2);
        assert_eq!(cursor.same_reg(0, 1), rax());
    }

    #[test]
    fn mem_group_destructures_five_consecutive_operands() {
        let ops = [
            Operand::Reg(rax()),
            Operand::Imm(4),
            Operand::Reg(rbx()),
            Operand::Imm(-8),
            Operand::NoReg,
        ];
        let cursor = Operands::new(Opcode::Mov32rm, &ops, 5);
        let mem = cursor.mem_group(0);
        assert_eq!(mem.base, Some(rax()));
        assert_eq!(mem.scale, 4);
        assert_eq!(mem.index, Some(rbx()));
        assert_eq!(mem.disp, -8);
        assert_eq!(mem.segment, None);
    }

    #[test]
    fn mem_group_no_index_is_none() {
        let ops = [
            Operand::NoReg,
            Operand::Imm(1),
            Operand::NoReg,
            Operand::Imm(0),
            Operand::NoReg,
        ];
        let cursor = Operands::new(Opcode::Mov32rm, &ops, 5);
        let mem = cursor.mem_group(0);
        assert!(mem.base.is_none());
        assert!(mem.index.is_none());
    }

    #[test]
    #[should_panic(expected = "scale 3 is not one of 1/2/4/8")]
    fn mem_group_rejects_invalid_scale() {
        let ops = [
            Operand::Reg(rax()),
            Operand::Imm(3),
            Operand::NoReg,
            Operand::Imm(0),
            Operand::NoReg,
        ];
        let cursor = Operands::new(Opcode::Mov32rm, &ops, 5);
        cursor.mem_group(0);
    }
}
