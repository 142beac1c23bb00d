//! The Dispatcher (spec §4.5): owns the per-instruction RIP pre-update and
//! routes each instruction to its family handler. Generalizes the
//! teacher's `Interpreter<S>` generic-over-collaborator shape (the core is
//! generic over the disassembler and decompiler-context traits, spec §6)
//! combined with `executors/instruction.rs`'s exhaustive-match dispatch
//! shape, applied to [`Opcode`] per spec §9's design note so an
//! unregistered opcode is a compile error rather than a runtime one.

use crate::collab::{CollabError, DecompilerContext, Disassembler, FunctionRef, SectionKind};
use crate::context::FunctionBuilder;
use crate::handlers;
use crate::ir::{Function, InstKind};
use crate::opcode::Opcode;
use crate::operand::Instruction;
use crate::reg::Canonical;
use crate::value::{ValueId, Width};

/// Lifts a single function's worth of instructions into IR, generic over
/// the external disassembler (`D`) and decompiler-context (`C`)
/// collaborators named in spec §6.
pub struct Emitter<'a, D, C> {
    disassembler: &'a D,
    decompiler: &'a C,
    pub(crate) builder: FunctionBuilder,
}

impl<'a, D, C> Emitter<'a, D, C>
where
    D: Disassembler,
    C: DecompilerContext,
{
    pub fn new(function_name: impl Into<String>, disassembler: &'a D, decompiler: &'a C) -> Self {
        Self {
            disassembler,
            decompiler,
            builder: FunctionBuilder::new(function_name),
        }
    }

    /// Lift one decoded instruction into the current insertion block.
    ///
    /// # Panics
    ///
    /// If `inst`'s operands violate the schema its opcode expects (spec §7
    /// item 1) — this is always a disassembler/decoder bug, never a
    /// recoverable condition.
    pub fn lift(&mut self, block: crate::ir::BlockId, inst: &Instruction) {
        self.builder.set_insert_point(block);

        // RIP pre-update happens for every instruction, unconditionally,
        // before dispatch (spec §4.5, §9 SUPPLEMENT C.2) — this makes RIP
        // observable to CALL's handler without per-handler bookkeeping.
        let next_rip = self.fallthrough_address(inst);
        let rip_val = self.builder.emit(InstKind::ConstInt {
            value: next_rip,
            width: Width::W64,
        });
        self.builder.set_reg(Canonical::Rip, rip_val);

        tracing::trace!(opcode = ?inst.opcode, address = inst.address, "lifting instruction");

        dispatch(self, inst);
    }

    /// The runtime address immediately after `inst` (spec §4.5: `next_rip
    /// = get_load_addr(source_addr, file, section) + instr_size`).
    pub(crate) fn fallthrough_address(&self, inst: &Instruction) -> u64 {
        self.disassembler.load_addr(inst.address) + inst.size
    }

    /// `fallthrough_address(inst) + disp`, the resolved target of a
    /// relative branch/call.
    pub(crate) fn target_address(&self, inst: &Instruction, disp: i64) -> u64 {
        (self.fallthrough_address(inst) as i64 + disp) as u64
    }

    pub(crate) fn function_by_addr(&self, addr: u64) -> Option<FunctionRef> {
        self.decompiler.function_by_addr(addr)
    }

    pub(crate) fn section_containing(&self, addr: u64) -> Result<SectionKind, CollabError> {
        self.decompiler.section_containing(addr)
    }

    pub(crate) fn resolve_plt_symbol(&self, addr: u64) -> Option<String> {
        self.decompiler.resolve_plt_symbol(addr)
    }

    /// Get-or-create a named block in the function under construction
    /// (spec §4.6): the entry point a caller uses to seed the first block
    /// before driving [`Self::lift`] over its instructions, and how a
    /// caller navigates to whatever block a prior branch already named.
    pub fn get_or_create_basic_block(&mut self, name: &str) -> crate::ir::BlockId {
        self.builder.get_or_create_basic_block(name)
    }

    /// The function under construction so far, for callers that want to
    /// inspect it mid-lift (e.g. to decide which block to lift into next).
    pub fn function(&self) -> &Function {
        self.builder.function()
    }

    /// The current SSA binding of `flag` in the function under
    /// construction, if anything has written it yet (spec §8 "Flag
    /// coverage"). Exposed for callers that want to check flag-coverage
    /// invariants without re-deriving them from the instruction stream.
    pub fn function_builder_flag(&self, flag: crate::flags::Flag) -> Option<ValueId> {
        self.builder.flag_current(flag)
    }

    /// Consume the emitter, handing back the lifted function.
    pub fn into_function(self) -> Function {
        self.builder.into_function()
    }
}

fn dispatch<D: Disassembler, C: DecompilerContext>(e: &mut Emitter<D, C>, inst: &Instruction) {
    use handlers::{arith, call, cmp, jcc, jmp, logic, mov, special, stack};
    use Opcode::*;

    match inst.opcode {
        Mov32r => mov::mov32r(e, inst),
        Mov32rm => mov::mov32rm(e, inst),
        Mov64r => mov::mov64r(e, inst),
        Mov64ri32 => mov::mov64ri32(e, inst),
        Mov8m => mov::mov8m(e, inst),
        Mov32m => mov::mov32m(e, inst),
        Mov64m => mov::mov64m(e, inst),
        Mov64mi32 => mov::mov64mi32(e, inst),
        Mov64rm => mov::mov64rm(e, inst),
        Lea64r => mov::lea64r(e, inst),

        Add32rr => arith::add32rr(e, inst),
        Add64rr => arith::add64rr(e, inst),
        Add32ri8 => arith::add32ri8(e, inst),
        Add64ri8 => arith::add64ri8(e, inst),
        Add64ri32 => arith::add64ri32(e, inst),
        Add64i32 => arith::add64i32(e, inst),

        Sub32rr => arith::sub32rr(e, inst),
        Sub64rr => arith::sub64rr(e, inst),
        Sub32ri8 => arith::sub32ri8(e, inst),
        Sub64ri8 => arith::sub64ri8(e, inst),
        Sub64ri32 => arith::sub64ri32(e, inst),
        Sub64i32 => arith::sub64i32(e, inst),

        Sar64r1 => logic::sar64r1(e, inst),
        Sar64ri => logic::sar64ri(e, inst),
        Shr64ri => logic::shr64ri(e, inst),
        And64ri8 => logic::and64ri8(e, inst),
        And32i32 => logic::and32i32(e, inst),
        Or64ri8 => logic::or64ri8(e, inst),
        Xor32rr => logic::xor32rr(e, inst),
        Neg32r => logic::neg32r(e, inst),

        Cmp32ri8 => cmp::cmp32ri8(e, inst),
        Cmp64ri8 => cmp::cmp64ri8(e, inst),
        Cmp64i32 => cmp::cmp64i32(e, inst),
        Cmp64rr => cmp::cmp64rr(e, inst),
        Cmp32mi8 => cmp::cmp32mi8(e, inst),
        Cmp64mi8 => cmp::cmp64mi8(e, inst),
        Cmp8mi => cmp::cmp8mi(e, inst),
        Cmp64rm => cmp::cmp64rm(e, inst),

        Test32rr => cmp::test32rr(e, inst),
        Test64rr => cmp::test64rr(e, inst),
        Test32ri8 => cmp::test32ri8(e, inst),
        Test64ri8 => cmp::test64ri8(e, inst),
        Test32mi8 => cmp::test32mi8(e, inst),
        Test64mi8 => cmp::test64mi8(e, inst),
        Test64rm => cmp::test64rm(e, inst),

        Ja => jcc::ja(e, inst),
        Jae => jcc::jae(e, inst),
        Jb => jcc::jb(e, inst),
        Jbe => jcc::jbe(e, inst),
        Je => jcc::je(e, inst),
        Jg => jcc::jg(e, inst),
        Jge => jcc::jge(e, inst),
        Jl => jcc::jl(e, inst),
        Jle => jcc::jle(e, inst),
        Jne => jcc::jne(e, inst),
        Jno => jcc::jno(e, inst),
        Jnp => jcc::jnp(e, inst),
        Jns => jcc::jns(e, inst),
        Jo => jcc::jo(e, inst),
        Jp => jcc::jp(e, inst),
        Js => jcc::js(e, inst),

        Jmp | Jmp64pcrel32 => jmp::jmp(e, inst),
        Jmp64r => jmp::jmp64r(e, inst),

        Call64pcrel32 => call::call64pcrel32(e, inst),
        Call64r => call::call64r(e, inst),
        Call64m => call::call64m(e, inst),
        Ret => call::ret(e, inst),

        Push64r => stack::push64r(e, inst),
        Pop64r => stack::pop64r(e, inst),
        Leave64 => stack::leave64(e, inst),

        Noop | Noopl | Noopw | RepPrefix | Hlt => special::noop(e, inst),

        Syscall => special::syscall(e, inst),
    }
}
