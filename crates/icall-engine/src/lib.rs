//! icall dispatch engine
//!
//! Lets a managed execution engine call native runtime services by a compact
//! build-time token instead of by name:
//!
//! - [`table`]: the validated, immutable [`EntryStore`] and its binary-search
//!   [`Resolver`]
//! - [`dispatch`]: the [`InvocationAdapter`] applying the Wrapped / Raw
//!   calling conventions
//! - [`registry`]: [`IcallRegistry`], built once behind a [`RegistrySlot`]
//! - [`manifest`] / [`catalog`]: reading the producer's generated header and
//!   binding its symbols to registered natives
//!
//! # Example
//!
//! ```ignore
//! use icall_engine::{DispatchConfig, IcallRegistry, RawEntry};
//! use icall_sdk::{CallConvention, DetachedContext, NativeEntry, NativeValue};
//!
//! fn add(args: &[i32]) -> i32 { args[0] + args[1] }
//!
//! let registry = IcallRegistry::build(
//!     [RawEntry::new(200, NativeEntry::AllInteger { arity: 2, func: add }, CallConvention::Raw)],
//!     DispatchConfig::default(),
//! )?;
//! let out = registry.dispatch(200, &mut DetachedContext::new(), &[NativeValue::int(2), NativeValue::int(3)])?;
//! ```

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fatal;
pub mod manifest;
pub mod registry;
pub mod table;

pub use catalog::{link_table, LinkError, SymbolCatalog};
pub use config::{ConfigError, DispatchConfig};
pub use dispatch::InvocationAdapter;
pub use error::{BuildError, InvokeError, NotFound};
pub use fatal::FatalAction;
pub use manifest::{AssemblyTable, ManifestEntry, ManifestError, TableManifest};
pub use registry::{IcallRegistry, RegistrySlot};
pub use table::{Entry, EntryStore, RawEntry, Resolver};

// Re-export SDK types natives and hosts need alongside the engine
pub use icall_sdk::{
    CallConvention, ManagedContext, ManagedError, NativeEntry, NativeValue, Scalar, Signature,
};
