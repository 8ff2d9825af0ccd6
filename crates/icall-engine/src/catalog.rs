//! Symbol catalog and table linking
//!
//! The runtime registers every native it exposes under the symbol name the
//! table producer uses. [`link_table`] then binds a generated
//! [`AssemblyTable`] to those natives, producing the records the
//! [`EntryStore`](crate::table::EntryStore) is built from. After linking,
//! dispatch goes by token only; names are never consulted again.

use icall_sdk::{NativeEntry, ReturnKind, ScalarKind, Signature};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::error::BuildError;
use crate::manifest::AssemblyTable;
use crate::table::RawEntry;

/// Errors that can occur while binding a generated table to natives
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Table names a symbol the runtime never registered
    #[error("Unknown native symbol for token {token}: {symbol}")]
    UnknownSymbol {
        /// Token of the entry
        token: u32,
        /// Symbol name from the table
        symbol: String,
    },

    /// Registered native disagrees with the generated prototype
    #[error("Native `{symbol}` (token {token}) is registered as {registered}, table declares {declared}")]
    SignatureMismatch {
        /// Token of the entry
        token: u32,
        /// Symbol name
        symbol: String,
        /// Prototype from the table
        declared: Signature,
        /// Signature of the registered native
        registered: Signature,
    },

    /// Linked records failed store validation
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Natives indexed by symbol name
#[derive(Debug, Default)]
pub struct SymbolCatalog {
    entries: FxHashMap<String, NativeEntry>,
}

impl SymbolCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native under `symbol`, replacing any previous registration
    pub fn register(&mut self, symbol: &str, entry: NativeEntry) {
        self.entries.insert(symbol.to_string(), entry);
    }

    /// Get a native by symbol (used at link time)
    pub fn get(&self, symbol: &str) -> Option<NativeEntry> {
        self.entries.get(symbol).copied()
    }

    /// Check if a symbol is registered
    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// Get the number of registered natives
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bind every entry of `table` to its registered native.
///
/// Returns an error on the first symbol that is missing or whose registered
/// shape disagrees with the generated prototype. Ordering and flag checks
/// are left to the entry store.
pub fn link_table(table: &AssemblyTable, catalog: &SymbolCatalog) -> Result<Vec<RawEntry>, LinkError> {
    let mut records = Vec::with_capacity(table.len());
    for entry in &table.entries {
        let native = catalog
            .get(&entry.symbol)
            .ok_or_else(|| LinkError::UnknownSymbol {
                token: entry.token,
                symbol: entry.symbol.clone(),
            })?;

        if let (Some(declared), Some(registered)) = (&entry.signature, native.signature()) {
            if !prototype_accepts(declared, &registered) {
                return Err(LinkError::SignatureMismatch {
                    token: entry.token,
                    symbol: entry.symbol.clone(),
                    declared: declared.clone(),
                    registered,
                });
            }
        }

        records.push(RawEntry {
            token: entry.token,
            native: Some(native),
            flags: entry.flags,
        });
    }
    Ok(records)
}

/// Generated prototypes spell addresses as `int`, so an `int` slot also
/// accepts a handle.
fn prototype_accepts(declared: &Signature, registered: &Signature) -> bool {
    fn slot(declared: ScalarKind, registered: ScalarKind) -> bool {
        declared == registered || (declared == ScalarKind::Int && registered == ScalarKind::Handle)
    }

    let ret_ok = match (declared.ret, registered.ret) {
        (ReturnKind::Void, ReturnKind::Void) => true,
        (ReturnKind::Scalar(d), ReturnKind::Scalar(r)) => slot(d, r),
        _ => false,
    };
    ret_ok
        && declared.arity() == registered.arity()
        && declared
            .params
            .iter()
            .zip(&registered.params)
            .all(|(&d, &r)| slot(d, r))
}
