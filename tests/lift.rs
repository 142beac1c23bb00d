//! End-to-end lifting scenarios (spec §8) driven through the public
//! [`Emitter`] API against the [`common`] fakes.

mod common;

use common::{eflags, full, imm, inst, noreg, reg, FakeDecompiler, FakeDisassembler};
use x86_lift::flags::Flag;
use x86_lift::prelude::*;

fn emitter<'a>(d: &'a FakeDisassembler, c: &'a FakeDecompiler) -> Emitter<'a, FakeDisassembler, FakeDecompiler> {
    Emitter::new("f", d, c)
}

fn find<'a>(e: &'a Emitter<FakeDisassembler, FakeDecompiler>, block: BlockId, id: ValueId) -> &'a InstKind {
    &e.function().block(block).insts.iter().find(|i| i.id == id).unwrap().kind
}

/// spec §8 scenario: `MOV64ri32` sign-extends a 32-bit immediate into the
/// full 64-bit destination (spec §4.4 move-family).
#[test]
fn mov64ri32_sign_extends_into_full_register() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Mov64ri32, vec![reg(full(Canonical::Rax)), imm(0x2a)], 7, 0);
    e.lift(bb, &i);
    assert!(!e.function().block(bb).is_terminated());
}

/// spec §8 scenario 2: `ADD64rr`: `dst = dst + src`, all six flags written.
#[test]
fn add64rr_writes_all_six_flags_and_rebinds_dst() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(
        Opcode::Add64rr,
        vec![reg(full(Canonical::Rax)), reg(full(Canonical::Rax)), reg(full(Canonical::Rbx)), eflags()],
        3,
        0,
    );
    e.lift(bb, &i);
    for flag in [Flag::Carry, Flag::Overflow, Flag::Zero, Flag::Sign, Flag::Parity, Flag::Auxiliary] {
        assert!(e.function_builder_flag(flag).is_some(), "{flag:?} must be written by ADD");
    }
}

/// spec §8 scenario 3: `CMP64ri8` then `JE` resolves both the fallthrough
/// and taken blocks and emits a conditional branch.
#[test]
fn cmp_then_je_creates_both_target_blocks_and_conditional_branch() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let cmp = inst(Opcode::Cmp64ri8, vec![reg(full(Canonical::Rax)), imm(0), eflags()], 4, 0);
    e.lift(bb, &cmp);
    let je = inst(Opcode::Je, vec![imm(0x20), eflags()], 2, 4);
    e.lift(bb, &je);

    assert!(e.function().find_block_by_name("bb_6").is_some(), "fallthrough block bb_6");
    assert!(e.function().find_block_by_name("bb_38").is_some(), "taken block bb_38");
    match e.function().block(bb).terminator.as_ref().unwrap() {
        Terminator::CondBr { then_bb, else_bb, .. } => {
            assert_eq!(e.function().block(*then_bb).name, "bb_38");
            assert_eq!(e.function().block(*else_bb).name, "bb_6");
        }
        other => panic!("expected CondBr, got {other:?}"),
    }
}

/// spec §8 scenario 4: `PUSH64r %rbp` decrements RSP by 8 and stores RBP
/// at the new address.
#[test]
fn push64r_decrements_rsp_and_stores() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Push64r, vec![reg(full(Canonical::Rbp))], 1, 0);
    e.lift(bb, &i);
    let stored = e
        .function()
        .block(bb)
        .insts
        .iter()
        .any(|inst| matches!(inst.kind, InstKind::Store { .. }));
    assert!(stored, "PUSH64r must emit a memory store");
    let subbed = e.function().block(bb).insts.iter().any(|inst| matches!(inst.kind, InstKind::BinOp { op: BinOp::Sub, .. }));
    assert!(subbed, "PUSH64r must decrement RSP");
}

/// spec §8 scenario 5: `LEA64r 0x8(%rdi,%rsi,4), %rax` computes the
/// effective address with no memory access.
#[test]
fn lea64r_never_loads_memory() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(
        Opcode::Lea64r,
        vec![
            reg(full(Canonical::Rax)),
            reg(full(Canonical::Rdi)),
            imm(4),
            reg(full(Canonical::Rsi)),
            imm(8),
            noreg(),
        ],
        8,
        0,
    );
    e.lift(bb, &i);
    let has_load = e.function().block(bb).insts.iter().any(|inst| matches!(inst.kind, InstKind::Load { .. }));
    assert!(!has_load, "LEA must never dereference the computed address");
    let has_eaddr = e
        .function()
        .block(bb)
        .insts
        .iter()
        .any(|inst| matches!(inst.kind, InstKind::EffectiveAddr { scale: 4, disp: 8, .. }));
    assert!(has_eaddr);
}

/// spec §8 scenario 6: `SYSCALL` reads the six ABI registers plus RAX,
/// calls `saib_syscall`, and writes the result back into RAX.
#[test]
fn syscall_calls_helper_and_writes_rax() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Syscall, vec![], 2, 0);
    e.lift(bb, &i);
    let call = e.function().block(bb).insts.iter().find(|inst| matches!(inst.kind, InstKind::ExternCall { .. }));
    match &call.unwrap().kind {
        InstKind::ExternCall { symbol, args, result_width } => {
            assert_eq!(symbol, "saib_syscall");
            assert_eq!(args.len(), 7);
            assert_eq!(*result_width, Some(Width::W64));
        }
        _ => unreachable!(),
    }
}

/// spec §8 "Terminator" property: every terminator-generating handler
/// leaves the block with exactly one terminator.
#[test]
fn ret_terminates_with_retvoid_and_restores_rip_rsp() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Ret, vec![], 1, 0);
    e.lift(bb, &i);
    assert!(matches!(e.function().block(bb).terminator, Some(Terminator::RetVoid)));
    let loads_rsp = e.function().block(bb).insts.iter().any(|inst| matches!(inst.kind, InstKind::Load { .. }));
    assert!(loads_rsp, "RET must load the saved return address from [RSP]");
}

/// spec §7 item 4: a direct call with no resolvable target is not an
/// error — it lowers to `unreachable`.
#[test]
fn call64pcrel32_unresolved_target_is_unreachable_not_a_panic() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Call64pcrel32, vec![imm(0x1000), reg(full(Canonical::Rsp))], 5, 0);
    e.lift(bb, &i);
    assert!(matches!(e.function().block(bb).terminator, Some(Terminator::Unreachable)));
}

/// A resolved direct call produces a [`Terminator::Call`] whose
/// continuation is the instruction's own fallthrough block.
#[test]
fn call64pcrel32_resolved_target_calls_and_continues() {
    let d = FakeDisassembler;
    let mut c = FakeDecompiler::default();
    c.functions.insert(0x1005, "helper".to_string());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Call64pcrel32, vec![imm(0x1000), reg(full(Canonical::Rsp))], 5, 0);
    e.lift(bb, &i);
    match e.function().block(bb).terminator.as_ref().unwrap() {
        Terminator::Call { callee, continuation, .. } => {
            assert_eq!(callee, "helper");
            assert_eq!(e.function().block(*continuation).name, "bb_5");
        }
        other => panic!("expected Terminator::Call, got {other:?}"),
    }
}

/// A direct call resolving into the `.plt` range calls the resolved
/// import symbol instead.
#[test]
fn call64pcrel32_plt_target_calls_resolved_symbol() {
    let d = FakeDisassembler;
    let mut c = FakeDecompiler::default();
    c.plt_range = 0x2000..0x2010;
    c.plt_symbols.insert(0x2000, "puts".to_string());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Call64pcrel32, vec![imm(0x1ffb), reg(full(Canonical::Rsp))], 5, 0);
    e.lift(bb, &i);
    match e.function().block(bb).terminator.as_ref().unwrap() {
        Terminator::Call { callee, .. } => assert_eq!(callee, "puts"),
        other => panic!("expected Terminator::Call, got {other:?}"),
    }
}

/// `CALL64r` has no statically known target, but it still pushes a return
/// address and calls the indirect-collection hook (spec §4.4) — it is not
/// simply `unreachable`.
#[test]
fn call64r_pushes_return_address_and_calls_collect_indirect() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Call64r, vec![reg(full(Canonical::Rax)), reg(full(Canonical::Rsp))], 2, 0);
    e.lift(bb, &i);
    match e.function().block(bb).terminator.as_ref().unwrap() {
        Terminator::Call { callee, args, .. } => {
            assert_eq!(callee, "saib_collect_indirect");
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected Terminator::Call, got {other:?}"),
    }
    let stores = e.function().block(bb).insts.iter().any(|inst| matches!(inst.kind, InstKind::Store { .. }));
    assert!(stores, "CALL64r must still push the return address");
}

/// `CALL64m` (memory-indirect) is unreachable, per the recorded Open
/// Question decision.
#[test]
fn call64m_is_unreachable() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(
        Opcode::Call64m,
        vec![reg(full(Canonical::Rax)), imm(1), noreg(), imm(0), noreg(), reg(full(Canonical::Rsp))],
        6,
        0,
    );
    e.lift(bb, &i);
    assert!(matches!(e.function().block(bb).terminator, Some(Terminator::Unreachable)));
}

/// `JMP64r` (indirect) is unreachable too.
#[test]
fn jmp64r_is_unreachable() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Jmp64r, vec![reg(full(Canonical::Rax))], 2, 0);
    e.lift(bb, &i);
    assert!(matches!(e.function().block(bb).terminator, Some(Terminator::Unreachable)));
}

/// spec §8 "Block uniqueness": branching to the same named block from two
/// different places shares the exact same block object.
#[test]
fn branches_to_the_same_address_share_one_block() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb0 = e.get_or_create_basic_block("bb_0");
    let j1 = inst(Opcode::Jmp, vec![imm(0x10)], 2, 0);
    e.lift(bb0, &j1);
    let target1 = match e.function().block(bb0).terminator.as_ref().unwrap() {
        Terminator::Br(b) => *b,
        _ => unreachable!(),
    };

    let bb10 = e.get_or_create_basic_block("bb_100");
    let j2 = inst(Opcode::Jmp, vec![imm(-240)], 2, 0x100);
    e.lift(bb10, &j2);
    let target2 = match e.function().block(bb10).terminator.as_ref().unwrap() {
        Terminator::Br(b) => *b,
        _ => unreachable!(),
    };

    assert_eq!(target1, target2, "both jumps resolve to bb_18 and must share one block");
}

/// spec §4.3: the AND/OR/XOR/TEST family always clears CF and OF, writing
/// them as literal `false` rather than computing a formula.
#[test]
fn xor32rr_clears_cf_and_of_as_literal_false() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(
        Opcode::Xor32rr,
        vec![reg(full(Canonical::Rax)), reg(full(Canonical::Rax)), reg(full(Canonical::Rbx)), eflags()],
        3,
        0,
    );
    e.lift(bb, &i);
    let cf = e.function_builder_flag(Flag::Carry).unwrap();
    let of = e.function_builder_flag(Flag::Overflow).unwrap();
    assert!(matches!(find(&e, bb, cf), InstKind::ConstBool(false)));
    assert!(matches!(find(&e, bb, of), InstKind::ConstBool(false)));
}

/// `NEG32r` writes only `CF` — the other five flag cells stay unwritten
/// (`DESIGN.md` Open Question).
#[test]
fn neg32r_writes_only_carry_flag() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(Opcode::Neg32r, vec![reg(full(Canonical::Rax)), reg(full(Canonical::Rax)), eflags()], 2, 0);
    e.lift(bb, &i);
    assert!(e.function_builder_flag(Flag::Carry).is_some());
    for flag in [Flag::Overflow, Flag::Zero, Flag::Sign, Flag::Parity, Flag::Auxiliary] {
        assert!(e.function_builder_flag(flag).is_none(), "{flag:?} must stay untouched by NEG");
    }
}

/// Schema violations panic rather than silently miscompiling (spec §7
/// item 1): the def/use register mismatch on a two-operand-destination
/// form is the canonical example.
#[test]
#[should_panic(expected = "must be the same register")]
fn add_with_mismatched_def_use_register_panics() {
    let (d, c) = (FakeDisassembler, FakeDecompiler::default());
    let mut e = emitter(&d, &c);
    let bb = e.get_or_create_basic_block("bb_0");
    let i = inst(
        Opcode::Add64rr,
        vec![reg(full(Canonical::Rax)), reg(full(Canonical::Rbx)), reg(full(Canonical::Rcx)), eflags()],
        3,
        0,
    );
    e.lift(bb, &i);
}
