//! Value Helpers (spec §4.2): pure IR-building functions over a
//! [`FunctionBuilder`] that every instruction handler composes. Grounded on
//! `IREmitter.cpp`'s `get_reg_val`/`store_reg_val`/`get_imm_val`/
//! `get_pointer_val`/`get_mem_val`/`store_mem_val`.

use crate::context::FunctionBuilder;
use crate::flags::Emit;
use crate::ir::{BinOp, InstKind};
use crate::reg::{Canonical, Register};
use crate::value::{ValueId, Width};

/// Read `reg`, truncating (or, for the legacy high-byte aliases,
/// shifting then truncating) from the canonical 64-bit cell down to
/// `reg`'s access width (spec §4.2 `get_reg_val`).
pub fn get_reg_val(ctx: &mut FunctionBuilder, reg: Register) -> ValueId {
    let full = ctx.reg_val(reg.canonical());
    match reg {
        Register::Full(_) => full,
        Register::Low32(_) | Register::Low16(_) | Register::Low8(_) => ctx.emit(InstKind::Trunc {
            src: full,
            width: reg.width(),
        }),
        Register::High8(_) => {
            let eight = ctx.emit(InstKind::ConstInt {
                value: 8,
                width: Width::W64,
            });
            let shifted = ctx.emit(InstKind::BinOp {
                op: BinOp::Shr,
                lhs: full,
                rhs: eight,
            });
            ctx.emit(InstKind::Trunc {
                src: shifted,
                width: Width::W8,
            })
        }
    }
}

/// Write `value` into `reg`, applying x86's sub-register write rules (spec
/// §4.2 `store_reg_val`): a 32-bit write zero-extends into the full 64-bit
/// cell; an 8- or 16-bit write merges into it, preserving the untouched
/// bits (at bit offset 8 for the legacy `AH`/`BH`/`CH`/`DH` aliases).
pub fn store_reg_val(ctx: &mut FunctionBuilder, reg: Register, value: ValueId) {
    match reg {
        Register::Full(c) => ctx.set_reg(c, value),
        Register::Low32(c) => {
            let zext = ctx.emit(InstKind::ZExt {
                src: value,
                from: Width::W32,
                width: Width::W64,
            });
            ctx.set_reg(c, zext);
        }
        Register::Low16(c) => merge_write(ctx, c, value, Width::W16, 0),
        Register::Low8(c) => merge_write(ctx, c, value, Width::W8, 0),
        Register::High8(c) => merge_write(ctx, c, value, Width::W8, 8),
    }
}

/// Clear the `width`-bit field at `bit_offset` in `canonical`'s full cell
/// and OR `value` (zero-extended) back in at that position.
fn merge_write(ctx: &mut FunctionBuilder, canonical: Canonical, value: ValueId, width: Width, bit_offset: u32) {
    let full = ctx.reg_val(canonical);
    let clear_mask = !(width.mask() << bit_offset);
    let mask_const = ctx.emit(InstKind::ConstInt {
        value: clear_mask,
        width: Width::W64,
    });
    let cleared = ctx.emit(InstKind::BinOp {
        op: BinOp::And,
        lhs: full,
        rhs: mask_const,
    });
    let zext = ctx.emit(InstKind::ZExt {
        src: value,
        from: width,
        width: Width::W64,
    });
    let inserted = if bit_offset == 0 {
        zext
    } else {
        let shift = ctx.emit(InstKind::ConstInt {
            value: bit_offset as u64,
            width: Width::W64,
        });
        ctx.emit(InstKind::BinOp {
            op: BinOp::Shl,
            lhs: zext,
            rhs: shift,
        })
    };
    let merged = ctx.emit(InstKind::BinOp {
        op: BinOp::Or,
        lhs: cleared,
        rhs: inserted,
    });
    ctx.set_reg(canonical, merged);
}

/// Build a constant of `init_width` bits from `imm` and sign-extend it to
/// `final_width` (spec §4.2 `get_imm_val`: "width promotion is always
/// sign-extension in this system").
pub fn get_imm_val(ctx: &mut FunctionBuilder, imm: i64, init_width: Width, final_width: Width) -> ValueId {
    let masked = (imm as u64) & init_width.mask();
    let raw = ctx.emit(InstKind::ConstInt {
        value: masked,
        width: init_width,
    });
    if init_width == final_width {
        raw
    } else {
        ctx.emit(InstKind::SExt {
            src: raw,
            from: init_width,
            width: final_width,
        })
    }
}

/// Compute `base + index*scale + disp` at 64-bit width (spec §4.2
/// `get_pointer_val`). `NoRegister` terms contribute zero; the segment
/// operand is threaded through unused (identity for flat addressing, per
/// spec).
pub fn get_pointer_val(
    ctx: &mut FunctionBuilder,
    base: Option<Register>,
    scale: u8,
    index: Option<Register>,
    disp: i64,
    _segment: Option<Register>,
) -> ValueId {
    let base_val = base.map(|r| get_reg_val(ctx, r));
    let index_val = index.map(|r| get_reg_val(ctx, r));
    ctx.emit(InstKind::EffectiveAddr {
        base: base_val,
        index: index_val,
        scale,
        disp,
    })
}

/// Effective address followed by a typed load (spec §4.2 `get_mem_val`).
#[allow(clippy::too_many_arguments)]
pub fn get_mem_val(
    ctx: &mut FunctionBuilder,
    base: Option<Register>,
    scale: u8,
    index: Option<Register>,
    disp: i64,
    segment: Option<Register>,
    width: Width,
) -> ValueId {
    let addr = get_pointer_val(ctx, base, scale, index, disp, segment);
    ctx.emit(InstKind::Load { addr, width })
}

/// Effective address followed by a store (spec §4.2 `store_mem_val`).
#[allow(clippy::too_many_arguments)]
pub fn store_mem_val(
    ctx: &mut FunctionBuilder,
    base: Option<Register>,
    scale: u8,
    index: Option<Register>,
    disp: i64,
    segment: Option<Register>,
    value: ValueId,
) {
    let addr = get_pointer_val(ctx, base, scale, index, disp, segment);
    ctx.emit(InstKind::Store { addr, value });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::Emit;

    fn builder_at_fresh_block() -> FunctionBuilder {
        let mut ctx = FunctionBuilder::new("f");
        let block = ctx.get_or_create_basic_block("bb_0");
        ctx.set_insert_point(block);
        ctx
    }

    /// spec §4.2/§8 "width rules": a 32-bit register write zero-extends
    /// into the full 64-bit canonical cell.
    #[test]
    fn store_reg_val_low32_zero_extends() {
        let mut ctx = builder_at_fresh_block();
        let v = ctx.emit(InstKind::ConstInt { value: 0x2a, width: Width::W32 });
        store_reg_val(&mut ctx, Register::Low32(Canonical::Rax), v);
        let bound = ctx.reg_current(Canonical::Rax).expect("rax bound after write");
        let inst = ctx
            .function()
            .blocks[0]
            .insts
            .iter()
            .find(|i| i.id == bound)
            .expect("bound value's defining instruction is in the block");
        match &inst.kind {
            InstKind::ZExt { src, from, width } => {
                assert_eq!(*src, v);
                assert_eq!(*from, Width::W32);
                assert_eq!(*width, Width::W64);
            }
            other => panic!("expected a ZExt from 32 to 64 bits, got {other:?}"),
        }
    }

    /// spec §4.2: an 8- or 16-bit write merges into the existing bits
    /// rather than clobbering the whole 64-bit cell — the final
    /// instruction bound to the canonical register must be a bitwise OR,
    /// not a bare extension.
    #[test]
    fn store_reg_val_low8_merges_into_existing_cell() {
        let mut ctx = builder_at_fresh_block();
        let existing = ctx.reg_val(Canonical::Rax);
        let v = ctx.emit(InstKind::ConstInt { value: 0xab, width: Width::W8 });
        store_reg_val(&mut ctx, Register::Low8(Canonical::Rax), v);
        let bound = ctx.reg_current(Canonical::Rax).unwrap();
        assert_ne!(bound, existing, "a merge write must rebind the cell");
        let inst = ctx.function().blocks[0].insts.iter().find(|i| i.id == bound).unwrap();
        assert!(matches!(inst.kind, InstKind::BinOp { op: BinOp::Or, .. }));
    }

    /// The legacy `AH`/`BH`/`CH`/`DH` aliases merge at bit offset 8, not 0.
    #[test]
    fn store_reg_val_high8_shifts_before_merging() {
        let mut ctx = builder_at_fresh_block();
        let v = ctx.emit(InstKind::ConstInt { value: 1, width: Width::W8 });
        store_reg_val(&mut ctx, Register::High8(Canonical::Rax), v);
        let shl = ctx
            .function()
            .blocks[0]
            .insts
            .iter()
            .find(|i| matches!(i.kind, InstKind::BinOp { op: BinOp::Shl, .. }));
        assert!(shl.is_some(), "High8 write must shift the zero-extended value into bit offset 8");
    }

    /// `get_reg_val` on a sub-register truncates the canonical cell rather
    /// than allocating a fresh read.
    #[test]
    fn get_reg_val_low32_truncates_canonical_cell() {
        let mut ctx = builder_at_fresh_block();
        let v = get_reg_val(&mut ctx, Register::Low32(Canonical::Rbx));
        let inst = ctx.function().blocks[0].insts.iter().find(|i| i.id == v).unwrap();
        assert!(matches!(inst.kind, InstKind::Trunc { width: Width::W32, .. }));
    }

    /// spec §4.2 `get_imm_val`: width promotion is always sign-extension.
    #[test]
    fn get_imm_val_promotes_via_sign_extension() {
        let mut ctx = builder_at_fresh_block();
        let v = get_imm_val(&mut ctx, -1, Width::W8, Width::W64);
        let inst = ctx.function().blocks[0].insts.iter().find(|i| i.id == v).unwrap();
        match &inst.kind {
            InstKind::SExt { from, width, .. } => {
                assert_eq!(*from, Width::W8);
                assert_eq!(*width, Width::W64);
            }
            other => panic!("expected SExt, got {other:?}"),
        }
    }

    /// Same-width immediates need no extension instruction at all.
    #[test]
    fn get_imm_val_same_width_is_a_bare_constant() {
        let mut ctx = builder_at_fresh_block();
        let v = get_imm_val(&mut ctx, 7, Width::W32, Width::W32);
        let inst = ctx.function().blocks[0].insts.iter().find(|i| i.id == v).unwrap();
        assert!(matches!(inst.kind, InstKind::ConstInt { value: 7, width: Width::W32 }));
    }

    /// spec §4.2 `get_pointer_val`: absent base/index terms contribute
    /// nothing (not a zero constant operand) to the effective address.
    #[test]
    fn get_pointer_val_omits_absent_terms() {
        let mut ctx = builder_at_fresh_block();
        let addr = get_pointer_val(&mut ctx, None, 1, None, 0x10, None);
        let inst = ctx.function().blocks[0].insts.iter().find(|i| i.id == addr).unwrap();
        match &inst.kind {
            InstKind::EffectiveAddr { base, index, scale, disp } => {
                assert!(base.is_none());
                assert!(index.is_none());
                assert_eq!(*scale, 1);
                assert_eq!(*disp, 0x10);
            }
            other => panic!("expected EffectiveAddr, got {other:?}"),
        }
    }
}
