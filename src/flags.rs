//! EFLAGS sub-flag cells and their per-operation-family formulas.
//!
//! Grounded on the teacher's `src/interpreter/alu.rs` split: small free
//! functions compute a result against explicit arguments, and a thin
//! wrapper threads them through the function-under-construction. Here the
//! "result" is itself IR (a `ValueId`), so the free functions take the
//! `Function`/`BlockId` pair they emit into instead of mutating an
//! interpreter's register file directly.

use crate::ir::{BinOp, ICmpPred, InstKind};
use crate::value::{ValueId, Width};

/// The six EFLAGS sub-flags this core models (spec §3 "Flag cells").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Carry,
    Parity,
    Auxiliary,
    Zero,
    Sign,
    Overflow,
}

impl Flag {
    /// Name this flag cell is keyed by in [`crate::ir::InstKind::ReadFlag`].
    pub const fn name(self) -> &'static str {
        match self {
            Flag::Carry => "CF",
            Flag::Parity => "PF",
            Flag::Auxiliary => "AF",
            Flag::Zero => "ZF",
            Flag::Sign => "SF",
            Flag::Overflow => "OF",
        }
    }
}

/// Current SSA bindings for every flag cell, owned per-function exactly like
/// [`crate::reg::RegisterFile`] — see spec §5.
#[derive(Debug, Clone, Default)]
pub struct FlagCells {
    cf: Option<ValueId>,
    pf: Option<ValueId>,
    af: Option<ValueId>,
    zf: Option<ValueId>,
    sf: Option<ValueId>,
    of: Option<ValueId>,
}

impl FlagCells {
    pub fn current(&self, flag: Flag) -> Option<ValueId> {
        match flag {
            Flag::Carry => self.cf,
            Flag::Parity => self.pf,
            Flag::Auxiliary => self.af,
            Flag::Zero => self.zf,
            Flag::Sign => self.sf,
            Flag::Overflow => self.of,
        }
    }

    pub fn set_current(&mut self, flag: Flag, value: ValueId) {
        match flag {
            Flag::Carry => self.cf = Some(value),
            Flag::Parity => self.pf = Some(value),
            Flag::Auxiliary => self.af = Some(value),
            Flag::Zero => self.zf = Some(value),
            Flag::Sign => self.sf = Some(value),
            Flag::Overflow => self.of = Some(value),
        }
    }
}

/// Minimal emit surface [`crate::flags`]'s free functions need. Implemented
/// by [`crate::context::FunctionBuilder`]; kept as a trait so flag formulas
/// stay testable against a bare `Function` without pulling in the rest of
/// the builder (mirrors the teacher's `AluCommonReg` bundling pattern, one
/// level of indirection simpler since there's only one IR to emit into).
pub trait Emit {
    fn emit(&mut self, kind: InstKind) -> ValueId;
}

/// `result`'s sign bit at `width`, as a fresh boolean IR value.
fn sign_bit(e: &mut impl Emit, result: ValueId, width: Width) -> ValueId {
    let shift_amt = e.emit(InstKind::ConstInt {
        value: (width.bits() - 1) as u64,
        width,
    });
    let shifted = e.emit(InstKind::BinOp {
        op: BinOp::Shr,
        lhs: result,
        rhs: shift_amt,
    });
    let one = e.emit(InstKind::ConstInt { value: 1, width });
    let bit = e.emit(InstKind::BinOp {
        op: BinOp::And,
        lhs: shifted,
        rhs: one,
    });
    let zero = e.emit(InstKind::ConstInt { value: 0, width });
    e.emit(InstKind::ICmp {
        pred: ICmpPred::Ne,
        lhs: bit,
        rhs: zero,
    })
}

/// Parity of `result`'s low byte (PF is defined over the low 8 bits only,
/// regardless of operand width).
fn parity_of_low_byte(e: &mut impl Emit, result: ValueId, width: Width) -> ValueId {
    let low_byte = e.emit(InstKind::Trunc {
        src: result,
        width: Width::W8,
    });
    let _ = width;
    // Even number of set bits among the low 8 => PF=1. Represented as an
    // opaque extern call: real bit counting is a fixed combinational
    // formula the IR-backend lowers however it likes; the lifter's job
    // ends at describing *which* bits feed the flag.
    e.emit(InstKind::ExternCall {
        symbol: "__parity8".into(),
        args: vec![low_byte],
        result_width: Some(Width::W8),
    })
}

fn zero_flag(e: &mut impl Emit, result: ValueId, width: Width) -> ValueId {
    let zero = e.emit(InstKind::ConstInt { value: 0, width });
    e.emit(InstKind::ICmp {
        pred: ICmpPred::Eq,
        lhs: result,
        rhs: zero,
    })
}

/// Flags common to ADD/SUB/CMP/NEG/shift families: ZF, SF, PF, computed
/// purely from the result (spec §4.3).
pub fn zf_sf_pf(e: &mut impl Emit, result: ValueId, width: Width) -> (ValueId, ValueId, ValueId) {
    (
        zero_flag(e, result, width),
        sign_bit(e, result, width),
        parity_of_low_byte(e, result, width),
    )
}

/// `CF`/`OF` for an addition `lhs + rhs = result` (spec §4.3 ADD formulas):
/// CF is unsigned overflow, OF is signed overflow (same-sign operands
/// producing a differently-signed result).
pub fn add_carry_overflow(e: &mut impl Emit, lhs: ValueId, rhs: ValueId, result: ValueId, width: Width) -> (ValueId, ValueId) {
    let cf = e.emit(InstKind::ICmp {
        pred: ICmpPred::UnsignedLt,
        lhs: result,
        rhs: lhs,
    });
    let lhs_sign = sign_bit(e, lhs, width);
    let rhs_sign = sign_bit(e, rhs, width);
    let res_sign = sign_bit(e, result, width);
    let operands_same_sign = e.emit(InstKind::ICmp {
        pred: ICmpPred::Eq,
        lhs: lhs_sign,
        rhs: rhs_sign,
    });
    let result_sign_differs = e.emit(InstKind::ICmp {
        pred: ICmpPred::Ne,
        lhs: lhs_sign,
        rhs: res_sign,
    });
    let of = e.emit(InstKind::BoolAnd {
        lhs: operands_same_sign,
        rhs: result_sign_differs,
    });
    (cf, of)
}

/// `CF`/`OF` for a subtraction `lhs - rhs = result` (spec §4.3 SUB/CMP
/// formulas, shared by `NEG` when it follows the "all six" reading):
/// CF is borrow (`lhs < rhs` unsigned), OF is signed overflow (differently
/// signed operands where the result takes the subtrahend's sign).
pub fn sub_carry_overflow(e: &mut impl Emit, lhs: ValueId, rhs: ValueId, result: ValueId, width: Width) -> (ValueId, ValueId) {
    let cf = e.emit(InstKind::ICmp {
        pred: ICmpPred::UnsignedLt,
        lhs,
        rhs,
    });
    let lhs_sign = sign_bit(e, lhs, width);
    let rhs_sign = sign_bit(e, rhs, width);
    let res_sign = sign_bit(e, result, width);
    let operands_differ = e.emit(InstKind::ICmp {
        pred: ICmpPred::Ne,
        lhs: lhs_sign,
        rhs: rhs_sign,
    });
    let result_took_rhs_sign = e.emit(InstKind::ICmp {
        pred: ICmpPred::Eq,
        lhs: res_sign,
        rhs: rhs_sign,
    });
    let of = e.emit(InstKind::BoolAnd {
        lhs: operands_differ,
        rhs: result_took_rhs_sign,
    });
    (cf, of)
}

/// A literal `false` IR value, used by the logical-family handlers
/// (AND/OR/XOR) which per spec §4.3/§4.4 clear `CF` and `OF` unconditionally
/// rather than computing them.
pub fn literal_false(e: &mut impl Emit) -> ValueId {
    e.emit(InstKind::ConstBool(false))
}

/// `AF`, the carry/borrow out of bit 3, shared by the ADD and SUB/CMP
/// families (spec §4.3: "carry out of bit 3 per addition/subtraction
/// semantics"). `is_add` selects which of the two directions to compute.
pub fn aux_carry(e: &mut impl Emit, lhs: ValueId, rhs: ValueId, width: Width, is_add: bool) -> ValueId {
    let nibble_mask = e.emit(InstKind::ConstInt { value: 0xF, width });
    let lhs_nibble = e.emit(InstKind::BinOp {
        op: BinOp::And,
        lhs,
        rhs: nibble_mask,
    });
    let rhs_nibble = e.emit(InstKind::BinOp {
        op: BinOp::And,
        lhs: rhs,
        rhs: nibble_mask,
    });
    if is_add {
        let sum = e.emit(InstKind::BinOp {
            op: BinOp::Add,
            lhs: lhs_nibble,
            rhs: rhs_nibble,
        });
        let overflow_bit = e.emit(InstKind::ConstInt { value: 0x10, width });
        let carried = e.emit(InstKind::BinOp {
            op: BinOp::And,
            lhs: sum,
            rhs: overflow_bit,
        });
        let zero = e.emit(InstKind::ConstInt { value: 0, width });
        e.emit(InstKind::ICmp {
            pred: ICmpPred::Ne,
            lhs: carried,
            rhs: zero,
        })
    } else {
        e.emit(InstKind::ICmp {
            pred: ICmpPred::UnsignedLt,
            lhs: lhs_nibble,
            rhs: rhs_nibble,
        })
    }
}

/// `CF` for a shift: the last bit shifted out, i.e. bit `amount - 1` of the
/// pre-shift value (spec §4.3 "shift: last bit shifted out").
pub fn shift_carry(e: &mut impl Emit, lhs: ValueId, amount: ValueId, width: Width) -> ValueId {
    let one = e.emit(InstKind::ConstInt { value: 1, width });
    let amount_minus_1 = e.emit(InstKind::BinOp {
        op: BinOp::Sub,
        lhs: amount,
        rhs: one,
    });
    let shifted = e.emit(InstKind::BinOp {
        op: BinOp::Shr,
        lhs,
        rhs: amount_minus_1,
    });
    let bit = e.emit(InstKind::BinOp {
        op: BinOp::And,
        lhs: shifted,
        rhs: one,
    });
    let zero = e.emit(InstKind::ConstInt { value: 0, width });
    e.emit(InstKind::ICmp {
        pred: ICmpPred::Ne,
        lhs: bit,
        rhs: zero,
    })
}

/// `OF` for a shift. x86 only defines this precisely for single-bit shifts;
/// this core generalizes it to "the sign bit changed across the shift",
/// which degenerates to the single-bit rule when `amount == 1` and is a
/// documented, deliberate generalization for the general case (spec §4.3
/// leaves the exact shift `OF` formula unspecified beyond "signed overflow
/// per operation"; see `DESIGN.md`).
pub fn shift_overflow(e: &mut impl Emit, lhs: ValueId, result: ValueId, width: Width) -> ValueId {
    let lhs_sign = sign_bit(e, lhs, width);
    let result_sign = sign_bit(e, result, width);
    e.emit(InstKind::ICmp {
        pred: ICmpPred::Ne,
        lhs: lhs_sign,
        rhs: result_sign,
    })
}

/// `CF` for `NEG`: `src != 0` (spec §4.3 "neg: src != 0"). `NEG32r` writes
/// only this flag and leaves the other five untouched (see `DESIGN.md`
/// Open Question on `NEG`'s flag coverage).
pub fn neg_carry(e: &mut impl Emit, src: ValueId, width: Width) -> ValueId {
    let zero = e.emit(InstKind::ConstInt { value: 0, width });
    e.emit(InstKind::ICmp {
        pred: ICmpPred::Ne,
        lhs: src,
        rhs: zero,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FunctionBuilder;

    fn builder() -> FunctionBuilder {
        let mut b = FunctionBuilder::new("f");
        let block = b.get_or_create_basic_block("bb_0");
        b.set_insert_point(block);
        b
    }

    fn kind_of(b: &FunctionBuilder, id: ValueId) -> InstKind {
        b.function().blocks[0]
            .insts
            .iter()
            .find(|i| i.id == id)
            .expect("value defined in this block")
            .kind
            .clone()
    }

    #[test]
    fn literal_false_is_a_const_bool() {
        let mut b = builder();
        let v = literal_false(&mut b);
        assert!(matches!(kind_of(&b, v), InstKind::ConstBool(false)));
    }

    #[test]
    fn zero_flag_compares_result_against_zero() {
        let mut b = builder();
        let r = b.emit(InstKind::ConstInt { value: 5, width: Width::W32 });
        let zf = zero_flag(&mut b, r, Width::W32);
        match kind_of(&b, zf) {
            InstKind::ICmp { pred: ICmpPred::Eq, lhs, .. } => assert_eq!(lhs, r),
            other => panic!("expected ICmp Eq, got {other:?}"),
        }
    }

    #[test]
    fn add_carry_overflow_combines_same_sign_operands_with_differing_result_sign() {
        let mut b = builder();
        let lhs = b.emit(InstKind::ConstInt { value: 1, width: Width::W32 });
        let rhs = b.emit(InstKind::ConstInt { value: 2, width: Width::W32 });
        let result = b.emit(InstKind::ConstInt { value: 3, width: Width::W32 });
        let (cf, of) = add_carry_overflow(&mut b, lhs, rhs, result, Width::W32);
        assert!(matches!(kind_of(&b, cf), InstKind::ICmp { pred: ICmpPred::UnsignedLt, .. }));
        assert!(matches!(kind_of(&b, of), InstKind::BoolAnd { .. }));
    }

    #[test]
    fn sub_carry_overflow_cf_is_unsigned_borrow() {
        let mut b = builder();
        let lhs = b.emit(InstKind::ConstInt { value: 1, width: Width::W32 });
        let rhs = b.emit(InstKind::ConstInt { value: 2, width: Width::W32 });
        let result = b.emit(InstKind::ConstInt { value: 0xffff_ffff, width: Width::W32 });
        let (cf, of) = sub_carry_overflow(&mut b, lhs, rhs, result, Width::W32);
        match kind_of(&b, cf) {
            InstKind::ICmp { pred: ICmpPred::UnsignedLt, lhs: l, rhs: r } => {
                assert_eq!(l, lhs);
                assert_eq!(r, rhs);
            }
            other => panic!("expected ICmp UnsignedLt(lhs, rhs), got {other:?}"),
        }
        assert!(matches!(kind_of(&b, of), InstKind::BoolAnd { .. }));
    }

    #[test]
    fn neg_carry_is_src_ne_zero() {
        let mut b = builder();
        let src = b.emit(InstKind::ConstInt { value: 9, width: Width::W32 });
        let cf = neg_carry(&mut b, src, Width::W32);
        match kind_of(&b, cf) {
            InstKind::ICmp { pred: ICmpPred::Ne, lhs, .. } => assert_eq!(lhs, src),
            other => panic!("expected ICmp Ne, got {other:?}"),
        }
    }

    #[test]
    fn shift_carry_reads_the_bit_just_shifted_out() {
        let mut b = builder();
        let lhs = b.emit(InstKind::ConstInt { value: 0b10, width: Width::W32 });
        let amount = b.emit(InstKind::ConstInt { value: 1, width: Width::W32 });
        let cf = shift_carry(&mut b, lhs, amount, Width::W32);
        assert!(matches!(kind_of(&b, cf), InstKind::ICmp { pred: ICmpPred::Ne, .. }));
    }

    #[test]
    fn shift_overflow_is_sign_bit_change() {
        let mut b = builder();
        let lhs = b.emit(InstKind::ConstInt { value: 0x8000_0000, width: Width::W32 });
        let result = b.emit(InstKind::ConstInt { value: 0x4000_0000, width: Width::W32 });
        let of = shift_overflow(&mut b, lhs, result, Width::W32);
        assert!(matches!(kind_of(&b, of), InstKind::ICmp { pred: ICmpPred::Ne, .. }));
    }

    #[test]
    fn aux_carry_add_checks_nibble_overflow_bit() {
        let mut b = builder();
        let lhs = b.emit(InstKind::ConstInt { value: 0xf, width: Width::W32 });
        let rhs = b.emit(InstKind::ConstInt { value: 0x1, width: Width::W32 });
        let af = aux_carry(&mut b, lhs, rhs, Width::W32, true);
        assert!(matches!(kind_of(&b, af), InstKind::ICmp { pred: ICmpPred::Ne, .. }));
    }

    #[test]
    fn aux_carry_sub_is_nibble_unsigned_lt() {
        let mut b = builder();
        let lhs = b.emit(InstKind::ConstInt { value: 0x0, width: Width::W32 });
        let rhs = b.emit(InstKind::ConstInt { value: 0x1, width: Width::W32 });
        let af = aux_carry(&mut b, lhs, rhs, Width::W32, false);
        assert!(matches!(kind_of(&b, af), InstKind::ICmp { pred: ICmpPred::UnsignedLt, .. }));
    }
}
