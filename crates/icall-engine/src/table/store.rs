//! Entry store: the validated, immutable icall table
//!
//! Built once from the producer's list of `(token, native, flags)` records.
//! The store never sorts; it checks that tokens are strictly ascending and
//! refuses to build otherwise.

use icall_sdk::{CallConvention, NativeEntry, MAX_ARITY};

use crate::error::BuildError;

/// One record as emitted by the table producer.
///
/// `native == None` is a null entry point and always fails validation.
#[derive(Debug, Clone, Copy)]
pub struct RawEntry {
    /// Build-time assigned token
    pub token: u32,
    /// Entry point, if the producer supplied one
    pub native: Option<NativeEntry>,
    /// Raw flag byte
    pub flags: u8,
}

impl RawEntry {
    /// Record for a present native
    pub fn new(token: u32, native: NativeEntry, convention: CallConvention) -> Self {
        RawEntry {
            token,
            native: Some(native),
            flags: convention.flag(),
        }
    }
}

/// A validated table entry.
///
/// Fields are private: token, entry point and convention are only ever set
/// together, at construction.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    token: u32,
    native: NativeEntry,
    convention: CallConvention,
}

impl Entry {
    /// Token identifying this entry
    #[inline]
    pub fn token(&self) -> u32 {
        self.token
    }

    /// Native entry point
    #[inline]
    pub fn native(&self) -> &NativeEntry {
        &self.native
    }

    /// Calling convention from the flag byte
    #[inline]
    pub fn convention(&self) -> CallConvention {
        self.convention
    }
}

/// Immutable, token-ordered table of entries
pub struct EntryStore {
    entries: Box<[Entry]>,
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl EntryStore {
    /// Validate and store the producer's records.
    pub fn new(records: impl IntoIterator<Item = RawEntry>) -> Result<Self, BuildError> {
        let records = records.into_iter();
        let mut entries = Vec::with_capacity(records.size_hint().0);
        let mut order = AscendingTokens::default();

        for (index, raw) in records.enumerate() {
            let token = raw.token;
            order.accept(token).map_err(|previous| BuildError::Unsorted {
                index,
                previous,
                token,
            })?;

            let native = raw.native.ok_or(BuildError::NullEntry { index, token })?;
            let convention = CallConvention::try_from(raw.flags)
                .map_err(|flags| BuildError::UnknownFlag { index, token, flags })?;

            let arity = native.arity();
            if arity > MAX_ARITY {
                return Err(BuildError::ArityTooLarge {
                    index,
                    token,
                    arity,
                    limit: MAX_ARITY,
                });
            }
            if !native.supports(convention) {
                return Err(BuildError::ConventionMismatch {
                    index,
                    token,
                    convention,
                });
            }

            entries.push(Entry {
                token,
                native,
                convention,
            });
        }

        Ok(Self {
            entries: entries.into_boxed_slice(),
        })
    }

    /// Build from the generated three-array layout.
    ///
    /// Index `i` of each slice describes the same entry.
    pub fn from_parallel(
        tokens: &[u32],
        natives: &[Option<NativeEntry>],
        flags: &[u8],
    ) -> Result<Self, BuildError> {
        if tokens.len() != natives.len() || tokens.len() != flags.len() {
            return Err(BuildError::LengthMismatch {
                tokens: tokens.len(),
                natives: natives.len(),
                flags: flags.len(),
            });
        }

        Self::new(
            tokens
                .iter()
                .zip(natives)
                .zip(flags)
                .map(|((&token, &native), &flags)| RawEntry {
                    token,
                    native,
                    flags,
                }),
        )
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a position
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// All entries, in token order
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate entries in token order
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Iterate tokens in ascending order
    pub fn tokens(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(Entry::token)
    }

    /// Number of entries using `convention`
    pub fn count_convention(&self, convention: CallConvention) -> usize {
        self.entries
            .iter()
            .filter(|e| e.convention == convention)
            .count()
    }
}

impl<'a> IntoIterator for &'a EntryStore {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The table ordering rule: each token strictly greater than the last.
#[derive(Debug, Default)]
pub(crate) struct AscendingTokens {
    previous: Option<u32>,
}

impl AscendingTokens {
    /// Accept `token`, or return the previous token it fails to exceed
    pub(crate) fn accept(&mut self, token: u32) -> Result<(), u32> {
        match self.previous {
            Some(previous) if token <= previous => Err(previous),
            _ => {
                self.previous = Some(token);
                Ok(())
            }
        }
    }
}

/// Find the first position where `tokens` stops being strictly ascending.
///
/// Returns `(index, previous, token)`.
pub(crate) fn first_unsorted(tokens: impl IntoIterator<Item = u32>) -> Option<(usize, u32, u32)> {
    let mut order = AscendingTokens::default();
    tokens
        .into_iter()
        .enumerate()
        .find_map(|(index, token)| order.accept(token).err().map(|previous| (index, previous, token)))
}
