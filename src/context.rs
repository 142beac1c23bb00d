//! The function-under-construction (spec §3, §4.6 Block/Function Context).
//!
//! Owns the block cache, the value-name uniquification table, the register
//! file, and the flag cells for exactly one [`crate::ir::Function`] being
//! lifted. Grounded on `IREmitter.cpp`'s `getOrCreateBasicBlock`/
//! `getIndexedValueName`/`getBaseValueName`, generalized so register/flag
//! pseudo-storage is per-function state rather than LLVM globals (spec §5:
//! "per-module, not process-global").

use std::collections::{HashMap, HashSet};

use crate::flags::{Emit, Flag, FlagCells};
use crate::ir::{BlockId, Function, InstKind, Terminator};
use crate::reg::{Canonical, RegisterFile};
use crate::value::{ValueId, Width};

pub struct FunctionBuilder {
    function: Function,
    current: Option<BlockId>,
    registers: RegisterFile,
    flag_cells: FlagCells,
    names: HashSet<String>,
    base_names: HashMap<String, String>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            function: Function::new(name),
            current: None,
            registers: RegisterFile::default(),
            flag_cells: FlagCells::default(),
            names: HashSet::new(),
            base_names: HashMap::new(),
        }
    }

    /// Set the block subsequent `emit`/`terminate` calls append into,
    /// mirroring `IRBuilder::SetInsertPoint` in the original.
    pub fn set_insert_point(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    fn current_block(&self) -> BlockId {
        self.current.expect("no insertion point set before emitting IR")
    }

    /// The sole block-creation primitive (spec §4.6): look up `name` within
    /// this function, creating an empty block at the end if absent. Two
    /// calls with the same name always return the same block (spec §8
    /// "Block uniqueness").
    pub fn get_or_create_basic_block(&mut self, name: &str) -> BlockId {
        if let Some(id) = self.function.find_block_by_name(name) {
            return id;
        }
        let id = self.function.push_block(name.to_string());
        tracing::debug!(block = name, "created basic block");
        id
    }

    /// Resolve a base name to a name unused in this function's symbol
    /// table, matching `IREmitter::getIndexedValueName`'s exact algorithm:
    /// the first use of a base name returns it unchanged; every later use
    /// appends an `_` (only when the base already ends in an ASCII digit)
    /// and probes suffixes `1, 2, 3, ...` until one is free.
    pub fn get_indexed_value_name(&mut self, base: &str) -> String {
        if !self.names.contains(base) {
            self.names.insert(base.to_string());
            return base.to_string();
        }

        let mut stem = base.to_string();
        if base.as_bytes().last().is_some_and(u8::is_ascii_digit) {
            stem.push('_');
        }

        let mut suffix = 0u64;
        loop {
            suffix += 1;
            let candidate = format!("{stem}{suffix}");
            if !self.names.contains(&candidate) {
                self.names.insert(candidate.clone());
                self.base_names.insert(candidate.clone(), base.to_string());
                return candidate;
            }
        }
    }

    /// Reverse lookup for [`Self::get_indexed_value_name`]: recovers the
    /// base name a uniquified name was derived from, or `name` itself if
    /// it was never renamed.
    pub fn get_base_value_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.base_names.get(name).map(String::as_str).unwrap_or(name)
    }

    /// The reaching SSA definition of `canonical`'s full 64 bits, lazily
    /// materializing a [`InstKind::ReadReg`] the first time this function
    /// reads a register no prior instruction in it has written (spec §3:
    /// flag/register cells "always reflect the most recent ... semantics").
    pub fn reg_val(&mut self, canonical: Canonical) -> ValueId {
        if let Some(v) = self.registers.current(canonical) {
            return v;
        }
        let block = self.current_block();
        let v = self.function.emit(
            block,
            InstKind::ReadReg {
                canonical: canonical.name().to_string(),
                width: Width::W64,
            },
        );
        self.registers.set_current(canonical, v);
        v
    }

    /// Rebind `canonical`'s full 64 bits to `value`.
    pub fn set_reg(&mut self, canonical: Canonical, value: ValueId) {
        self.registers.set_current(canonical, value);
    }

    /// The current SSA binding of `canonical`, if this function has bound
    /// it at all yet. Introspection for callers (and tests) that want to
    /// check the width/flag-coverage invariants in spec §8 without
    /// re-deriving them from the instruction stream.
    pub fn reg_current(&self, canonical: Canonical) -> Option<ValueId> {
        self.registers.current(canonical)
    }

    /// The current SSA binding of `flag`, if this function has written it
    /// yet (spec §8 "Flag coverage").
    pub fn flag_current(&self, flag: Flag) -> Option<ValueId> {
        self.flag_cells.current(flag)
    }

    /// The reaching SSA definition of `flag`, lazily materializing an
    /// [`InstKind::ReadFlag`] on first read, by the same rule as
    /// [`Self::reg_val`].
    pub fn flag_val(&mut self, flag: Flag) -> ValueId {
        if let Some(v) = self.flag_cells.current(flag) {
            return v;
        }
        let block = self.current_block();
        let v = self.function.emit(block, InstKind::ReadFlag { name: flag.name().to_string() });
        self.flag_cells.set_current(flag, v);
        v
    }

    /// Rebind `flag` to `value`.
    pub fn set_flag(&mut self, flag: Flag, value: ValueId) {
        self.flag_cells.set_current(flag, value);
    }

    /// Seal the current insertion block with `terminator` (spec §3: every
    /// terminator-generating handler leaves its block terminated and
    /// appends nothing further to it). Clears the insertion point, so a
    /// handler that forgets to call `set_insert_point` again before
    /// emitting more IR panics immediately rather than silently reopening
    /// a sealed block.
    pub fn terminate(&mut self, terminator: Terminator) {
        let block = self.current_block();
        self.function.terminate(block, terminator);
        self.current = None;
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn into_function(self) -> Function {
        self.function
    }

    /// Append `kind` to the current insertion block. An inherent method
    /// (in addition to the [`Emit`] impl below) so handler modules can call
    /// `builder.emit(...)` directly without importing the trait; the
    /// trait impl exists so [`crate::flags`]'s formulas stay generic over
    /// anything that can accept IR, not just this concrete builder.
    pub fn emit(&mut self, kind: InstKind) -> ValueId {
        let block = self.current_block();
        self.function.emit(block, kind)
    }
}

impl Emit for FunctionBuilder {
    fn emit(&mut self, kind: InstKind) -> ValueId {
        FunctionBuilder::emit(self, kind)
    }
}
