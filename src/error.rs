//! Error types for this crate's one genuinely fallible path.
//!
//! Everything else in this core fails loudly by panicking (spec §7:
//! operand-schema violations and unknown opcodes are disassembler bugs, not
//! recoverable input errors). The sole exception is PLT/section resolution,
//! which depends on an external object-file collaborator that can
//! legitimately fail to answer (spec §7 item 3).

use thiserror::Error;

/// Failure resolving a call target against the external object-file/symbol
/// collaborator (spec §6, §7).
#[derive(Debug, Error)]
pub enum CollabError {
    /// The section containing a candidate call target couldn't be located.
    #[error("failed to locate section for address {address:#x}: {reason}")]
    SectionLookup { address: u64, reason: String },
}
