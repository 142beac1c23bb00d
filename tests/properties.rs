//! Property tests for the universally-quantified invariants in spec §8:
//! name uniquification and block-cache identity must hold for arbitrary
//! sequences of inputs, not just the handful of examples in `lift.rs`.
//! Grounded on the teacher's `#[quickcheck]` usage in
//! `interpreter/executors/instruction/tests/reserved_registers.rs`.

use std::collections::HashSet;

use quickcheck_macros::quickcheck;

use x86_lift::context::FunctionBuilder;

/// spec §8 "Name uniquification": `get_indexed_value_name(base)` called
/// repeatedly under the same symbol table produces pairwise distinct names,
/// and every returned name maps back to `base` under `get_base_value_name`.
#[quickcheck]
fn indexed_value_names_are_pairwise_distinct(base: String, calls: u8) -> bool {
    if base.is_empty() {
        return true;
    }
    let mut builder = FunctionBuilder::new("f");
    let mut seen = HashSet::new();
    for _ in 0..=calls {
        let name = builder.get_indexed_value_name(&base);
        if !seen.insert(name.clone()) {
            return false;
        }
        if builder.get_base_value_name(&name) != base {
            return false;
        }
    }
    true
}

/// spec §8 "Block uniqueness": `get_or_create_basic_block(n, f)` called k
/// times with the same name returns the same block and creates exactly one
/// block in the function, for any name and any repeat count.
#[quickcheck]
fn get_or_create_basic_block_is_idempotent_for_any_name(name: String, calls: u8) -> bool {
    let mut builder = FunctionBuilder::new("f");
    let first = builder.get_or_create_basic_block(&name);
    for _ in 0..calls {
        if builder.get_or_create_basic_block(&name) != first {
            return false;
        }
    }
    builder.function().blocks.len() == 1
}

/// Two distinct block names never collide, regardless of creation order.
#[quickcheck]
fn distinct_names_create_distinct_blocks(a: String, b: String) -> bool {
    if a == b {
        return true;
    }
    let mut builder = FunctionBuilder::new("f");
    let ba = builder.get_or_create_basic_block(&a);
    let bb = builder.get_or_create_basic_block(&b);
    ba != bb && builder.function().blocks.len() == 2
}
