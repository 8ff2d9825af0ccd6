//! The icall registry and its initialization barrier
//!
//! [`IcallRegistry`] is the immutable dispatch table the runtime builds once
//! at startup and hands by reference to whatever executes call-dispatch
//! instructions. [`RegistrySlot`] is the barrier: nothing can resolve a
//! token before the slot has been filled, and it can be filled only once.

use icall_sdk::{CallConvention, ManagedContext, NativeValue};
use once_cell::sync::OnceCell;

use crate::catalog::{link_table, LinkError, SymbolCatalog};
use crate::config::DispatchConfig;
use crate::dispatch::InvocationAdapter;
use crate::error::{BuildError, InvokeError};
use crate::fatal;
use crate::manifest::AssemblyTable;
use crate::table::{EntryStore, RawEntry, Resolver};

/// Immutable token → native dispatch table.
///
/// `Send + Sync`: after construction there is no writer, so any number of
/// threads may resolve and invoke concurrently without locking.
#[derive(Debug)]
pub struct IcallRegistry {
    store: EntryStore,
    config: DispatchConfig,
}

impl IcallRegistry {
    /// Validate `records` and build the registry
    pub fn build(
        records: impl IntoIterator<Item = RawEntry>,
        config: DispatchConfig,
    ) -> Result<Self, BuildError> {
        let store = EntryStore::new(records)?;
        log::debug!(
            "icall registry built: {} entries ({} wrapped, {} raw)",
            store.len(),
            store.count_convention(CallConvention::Wrapped),
            store.count_convention(CallConvention::Raw)
        );
        Ok(Self { store, config })
    }

    /// Link a generated assembly table against `catalog` and build
    pub fn from_manifest(
        table: &AssemblyTable,
        catalog: &SymbolCatalog,
        config: DispatchConfig,
    ) -> Result<Self, LinkError> {
        let records = link_table(table, catalog)?;
        log::debug!("linked icall table `{}` ({} entries)", table.name, records.len());
        Ok(Self::build(records, config)?)
    }

    /// Backing entry store
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Active configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Resolver over this registry's store
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.store, self.config.on_unresolved)
    }

    /// Invocation adapter configured for this registry
    pub fn adapter(&self) -> InvocationAdapter {
        InvocationAdapter::new(&self.config)
    }

    /// Resolve `token` at a live call site and invoke it.
    ///
    /// A missing token is fatal (see [`Resolver::resolve_call_site`]).
    pub fn dispatch(
        &self,
        token: u32,
        ctx: &mut dyn ManagedContext,
        args: &[NativeValue],
    ) -> Result<NativeValue, InvokeError> {
        let entry = self.resolver().resolve_call_site(token);
        self.adapter().invoke(entry, ctx, args)
    }
}

/// Once-only home for the process's registry.
///
/// Owned by the call-dispatch subsystem; other components receive
/// `&IcallRegistry` from [`RegistrySlot::get`].
#[derive(Debug, Default)]
pub struct RegistrySlot {
    cell: OnceCell<IcallRegistry>,
}

impl RegistrySlot {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Install the registry. Fails if one is already installed.
    pub fn initialize(&self, registry: IcallRegistry) -> Result<&IcallRegistry, BuildError> {
        self.cell
            .try_insert(registry)
            .map_err(|_| BuildError::AlreadyInitialized)
    }

    /// Build from `records` and install, escalating any failure as fatal.
    ///
    /// The runtime cannot start with an invalid table. Failures escalate
    /// with [`DispatchConfig::on_unresolved`].
    pub fn initialize_or_escalate(
        &self,
        records: impl IntoIterator<Item = RawEntry>,
        config: DispatchConfig,
    ) -> &IcallRegistry {
        let action = config.on_unresolved;
        match IcallRegistry::build(records, config).and_then(|registry| self.initialize(registry)) {
            Ok(registry) => registry,
            Err(err) => fatal::escalate(action, &err),
        }
    }

    /// The installed registry, or `None` before initialization
    pub fn get(&self) -> Option<&IcallRegistry> {
        self.cell.get()
    }

    /// Check if the registry has been installed
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
