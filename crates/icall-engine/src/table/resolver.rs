//! Token → entry resolution

use crate::error::NotFound;
use crate::fatal::{self, FatalAction};

use super::store::{Entry, EntryStore};

/// Binary-search view over an [`EntryStore`].
///
/// Borrows the store, so its count is the store's count.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a EntryStore,
    on_miss: FatalAction,
}

impl<'a> Resolver<'a> {
    /// Create a resolver; `on_miss` applies to [`Resolver::resolve_call_site`]
    pub fn new(store: &'a EntryStore, on_miss: FatalAction) -> Self {
        Self { store, on_miss }
    }

    /// Number of resolvable entries
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if nothing can be resolved
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Look up the entry for `token`.
    ///
    /// O(log n) comparisons. A miss is reported, never substituted.
    #[inline]
    pub fn resolve(&self, token: u32) -> Result<&'a Entry, NotFound> {
        let entries = self.store.entries();
        entries
            .binary_search_by_key(&token, Entry::token)
            .map(|index| &entries[index])
            .map_err(|_| NotFound { token })
    }

    /// Check if `token` is present
    #[inline]
    pub fn contains(&self, token: u32) -> bool {
        self.resolve(token).is_ok()
    }

    /// Resolve a token referenced by a live call site.
    ///
    /// A miss means managed code and runtime were built against different
    /// token universes; it is escalated through the fatal path and never
    /// returns.
    pub fn resolve_call_site(&self, token: u32) -> &'a Entry {
        match self.resolve(token) {
            Ok(entry) => entry,
            Err(miss) => fatal::escalate(self.on_miss, &miss),
        }
    }

    /// Resolve every call site of a module up front.
    ///
    /// Fails on the first missing token.
    pub fn link(&self, tokens: &[u32]) -> Result<Vec<&'a Entry>, NotFound> {
        tokens.iter().map(|&token| self.resolve(token)).collect()
    }
}
