//! Error types for table construction, resolution and invocation

use icall_sdk::{CallConvention, ManagedError, ScalarKind};
use thiserror::Error;

/// Failure to construct an entry store.
///
/// Every variant is fatal: the runtime cannot start with a table that
/// failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Tokens are not strictly ascending (includes duplicates)
    #[error("icall table unsorted at index {index}: token {token} follows {previous}")]
    Unsorted {
        /// Position of the offending entry
        index: usize,
        /// Token of the preceding entry
        previous: u32,
        /// Offending token
        token: u32,
    },

    /// Entry point missing
    #[error("icall table entry {index} (token {token}) has a null native entry")]
    NullEntry {
        /// Position of the offending entry
        index: usize,
        /// Offending token
        token: u32,
    },

    /// Flag byte outside the recognized set
    #[error("icall table entry {index} (token {token}) has unrecognized flags {flags:#04x}")]
    UnknownFlag {
        /// Position of the offending entry
        index: usize,
        /// Offending token
        token: u32,
        /// Raw flag byte
        flags: u8,
    },

    /// Parallel sequences of different lengths
    #[error("icall table sequences differ in length: {tokens} tokens, {natives} natives, {flags} flags")]
    LengthMismatch {
        /// Token count
        tokens: usize,
        /// Native entry count
        natives: usize,
        /// Flag byte count
        flags: usize,
    },

    /// Native shape not callable with the entry's convention
    #[error("icall table entry {index} (token {token}): managed native cannot use the {convention} convention")]
    ConventionMismatch {
        /// Position of the offending entry
        index: usize,
        /// Offending token
        token: u32,
        /// Convention from the flag byte
        convention: CallConvention,
    },

    /// Native declares more parameters than the marshaling buffers hold
    #[error("icall table entry {index} (token {token}) takes {arity} arguments, limit is {limit}")]
    ArityTooLarge {
        /// Position of the offending entry
        index: usize,
        /// Offending token
        token: u32,
        /// Declared arity
        arity: usize,
        /// Maximum supported arity
        limit: usize,
    },

    /// The registry slot was already filled
    #[error("icall registry already initialized")]
    AlreadyInitialized,
}

/// A token absent from the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("icall token {token} is not in the table")]
pub struct NotFound {
    /// The token that was looked up
    pub token: u32,
}

/// Failure of a single dispatched call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// Managed-level error raised by a Wrapped native, passed through unchanged
    #[error(transparent)]
    Managed(#[from] ManagedError),

    /// Call site supplied the wrong number of arguments
    #[error("icall {token}: expected {expected} argument(s), got {got}")]
    Arity {
        /// Token being invoked
        token: u32,
        /// Declared arity
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Call site supplied an argument of the wrong kind
    #[error("icall {token}: argument {index} expected {expected}, got {got}")]
    ArgumentKind {
        /// Token being invoked
        token: u32,
        /// Argument position
        index: usize,
        /// Declared kind
        expected: &'static str,
        /// Supplied kind
        got: &'static str,
    },

    /// Mixed native returned a scalar other than the declared kind
    #[error("icall {token}: native returned {got}, declared {expected}")]
    ReturnKind {
        /// Token being invoked
        token: u32,
        /// Declared return kind
        expected: ScalarKind,
        /// Returned kind
        got: ScalarKind,
    },
}
