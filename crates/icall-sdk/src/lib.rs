//! icall SDK - types for writing natives reachable through the icall table
//!
//! This crate provides the minimal types needed to write native routines
//! that managed code invokes by token, without depending on the dispatch
//! engine itself.
//!
//! # Example
//!
//! ```ignore
//! use icall_sdk::{NativeEntry, Scalar};
//!
//! fn tick_count(_args: &[i32]) -> i32 {
//!     42
//! }
//!
//! const TICK_COUNT: NativeEntry = NativeEntry::AllInteger { arity: 0, func: tick_count };
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod entry;
pub mod error;
pub mod value;

pub use context::{DetachedContext, FrameMark, ManagedContext};
pub use entry::{
    AllIntegerFn, CallConvention, IntegerVoidFn, ManagedFn, MixedFn, MixedSignature,
    NativeEntry, ReturnKind, ReturnsHandleFn, Signature, SignatureClass, FLAG_RAW, FLAG_WRAPPED,
    MAX_ARITY,
};
pub use error::{ManagedError, ManagedResult};
pub use value::{Handle, NativeValue, ObjectRef, Scalar, ScalarKind};
