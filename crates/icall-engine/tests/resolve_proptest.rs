//! Property-based tests for table construction and resolution.
//!
//! Binary-search resolution is checked against a linear scan over the same
//! records, and construction is checked to reject every unsorted input.

use std::collections::BTreeSet;

use icall_engine::{BuildError, EntryStore, FatalAction, RawEntry, Resolver};
use icall_sdk::{NativeEntry, FLAG_RAW, FLAG_WRAPPED};
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn ident(args: &[i32]) -> i32 {
    args[0]
}

fn record(token: u32, raw: bool) -> RawEntry {
    RawEntry {
        token,
        native: Some(NativeEntry::AllInteger {
            arity: 1,
            func: ident,
        }),
        flags: if raw { FLAG_RAW } else { FLAG_WRAPPED },
    }
}

/// Trivial reference: scan every record
fn linear_resolve(records: &[RawEntry], token: u32) -> Option<usize> {
    records.iter().position(|r| r.token == token)
}

fn sorted_records() -> impl Strategy<Value = Vec<RawEntry>> {
    (
        prop::collection::btree_set(0u32..20_000, 0..200),
        any::<u64>(),
    )
        .prop_map(|(tokens, seed)| {
            tokens
                .into_iter()
                .enumerate()
                .map(|(i, token)| record(token, (seed >> (i % 64)) & 1 == 1))
                .collect()
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn binary_search_matches_linear_scan(
        records in sorted_records(),
        probes in prop::collection::vec(0u32..20_500, 1..64),
    ) {
        let store = EntryStore::new(records.clone()).unwrap();
        let resolver = Resolver::new(&store, FatalAction::Panic);
        prop_assert_eq!(resolver.len(), store.len());
        prop_assert_eq!(store.len(), records.len());

        for r in &records {
            let entry = resolver.resolve(r.token).unwrap();
            prop_assert_eq!(entry.token(), r.token);
            prop_assert_eq!(entry.convention().flag(), r.flags);
        }

        for token in probes {
            let fast = resolver.resolve(token).ok().map(|e| e.token());
            let slow = linear_resolve(&records, token).map(|i| records[i].token);
            prop_assert_eq!(fast, slow);
        }
    }

    #[test]
    fn absent_token_is_not_found(records in sorted_records(), probe in any::<u32>()) {
        let present: BTreeSet<u32> = records.iter().map(|r| r.token).collect();
        prop_assume!(!present.contains(&probe));

        let store = EntryStore::new(records).unwrap();
        let resolver = Resolver::new(&store, FatalAction::Panic);
        prop_assert_eq!(resolver.resolve(probe).unwrap_err().token, probe);
    }

    #[test]
    fn stored_tokens_strictly_increase(records in sorted_records()) {
        let store = EntryStore::new(records).unwrap();
        let tokens: Vec<u32> = store.tokens().collect();
        for pair in tokens.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn out_of_order_input_is_rejected(
        records in sorted_records().prop_filter("need two entries", |r| r.len() >= 2),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut records = records;
        let i = pick.index(records.len() - 1);
        records.swap(i, i + 1);

        let err = EntryStore::new(records).unwrap_err();
        let is_unsorted = matches!(err, BuildError::Unsorted { index, .. } if index == i + 1);
        prop_assert!(is_unsorted);
    }
}
