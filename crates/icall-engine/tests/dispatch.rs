//! End-to-end dispatch through a small registry.
//!
//! Table: [(100, fn_a, Wrapped), (200, fn_b, Raw), (305, fn_c, Wrapped)]

use icall_engine::{
    DispatchConfig, FatalAction, IcallRegistry, InvokeError, NotFound, RawEntry, RegistrySlot,
};
use icall_sdk::{
    CallConvention, FrameMark, ManagedContext, ManagedError, ManagedResult, NativeEntry,
    NativeValue, ObjectRef,
};

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

/// Context that records how the adapter drove it
#[derive(Default)]
struct RecordingContext {
    depth: usize,
    pushes: usize,
    pops: usize,
    takes: usize,
    pending: Option<ManagedError>,
}

impl ManagedContext for RecordingContext {
    fn push_handle_frame(&mut self) -> FrameMark {
        self.pushes += 1;
        self.depth += 1;
        FrameMark(self.depth - 1)
    }

    fn pop_handle_frame(&mut self, mark: FrameMark) {
        self.pops += 1;
        self.depth = mark.0;
    }

    fn set_pending_error(&mut self, error: ManagedError) {
        self.pending = Some(error);
    }

    fn take_pending_error(&mut self) -> Option<ManagedError> {
        self.takes += 1;
        self.pending.take()
    }
}

fn fn_a(_ctx: &mut dyn ManagedContext, args: &[NativeValue]) -> ManagedResult<NativeValue> {
    match args[0].as_object() {
        Some(obj) => Ok(NativeValue::object(ObjectRef(obj.0 + 1))),
        None => Err(ManagedError::null_reference("fn_a: receiver is null")),
    }
}

fn fn_b(args: &[i32]) -> i32 {
    args[0] * 10 + args[1]
}

fn fn_c(ctx: &mut dyn ManagedContext, _args: &[NativeValue]) -> ManagedResult<NativeValue> {
    // Raises through the pending slot instead of the return value.
    ctx.set_pending_error(ManagedError::new("System.InvalidOperationException", "fn_c"));
    Ok(NativeValue::Void)
}

fn records() -> Vec<RawEntry> {
    vec![
        RawEntry::new(100, NativeEntry::Managed { arity: 1, func: fn_a }, CallConvention::Wrapped),
        RawEntry::new(200, NativeEntry::AllInteger { arity: 2, func: fn_b }, CallConvention::Raw),
        RawEntry::new(305, NativeEntry::Managed { arity: 0, func: fn_c }, CallConvention::Wrapped),
    ]
}

fn registry() -> IcallRegistry {
    let config = DispatchConfig {
        on_unresolved: FatalAction::Panic,
        ..DispatchConfig::default()
    };
    IcallRegistry::build(records(), config).expect("valid table")
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_resolve_scenario() {
    let registry = registry();
    let resolver = registry.resolver();

    let b = resolver.resolve(200).unwrap();
    assert_eq!(b.token(), 200);
    assert_eq!(b.convention(), CallConvention::Raw);
    assert_eq!(b.native().arity(), 2);

    assert_eq!(resolver.resolve(150).unwrap_err(), NotFound { token: 150 });
}

#[test]
fn test_resolver_count_matches_store() {
    let registry = registry();
    assert_eq!(registry.resolver().len(), registry.store().len());
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_tokens_strictly_increasing() {
    let registry = registry();
    let tokens: Vec<u32> = registry.store().tokens().collect();
    assert!(tokens.windows(2).all(|w| w[0] < w[1]));
}

// ────────────────────────────────────────────────────────────────────────────
// Invocation
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_raw_call_skips_exception_wrapper() {
    let registry = registry();
    let mut ctx = RecordingContext::default();

    let out = registry
        .dispatch(200, &mut ctx, &[NativeValue::int(4), NativeValue::int(2)])
        .unwrap();
    assert_eq!(out, NativeValue::int(42));
    assert_eq!(ctx.pushes, 0);
    assert_eq!(ctx.pops, 0);
    assert_eq!(ctx.takes, 0);
}

#[test]
fn test_wrapped_call_returns_value() {
    let registry = registry();
    let mut ctx = RecordingContext::default();

    let out = registry
        .dispatch(100, &mut ctx, &[NativeValue::object(ObjectRef(7))])
        .unwrap();
    assert_eq!(out, NativeValue::object(ObjectRef(8)));
    assert_eq!(ctx.pushes, 1);
    assert_eq!(ctx.pops, 1);
    assert_eq!(ctx.depth, 0);
}

#[test]
fn test_wrapped_error_propagates_unchanged() {
    let registry = registry();
    let mut ctx = RecordingContext::default();

    let err = registry
        .dispatch(100, &mut ctx, &[NativeValue::Void])
        .unwrap_err();
    assert_eq!(
        err,
        InvokeError::Managed(ManagedError::null_reference("fn_a: receiver is null"))
    );
    // Frame released on the error path too.
    assert_eq!(ctx.pushes, ctx.pops);
    assert_eq!(ctx.depth, 0);
}

#[test]
fn test_wrapped_pending_error_propagates() {
    let registry = registry();
    let mut ctx = RecordingContext::default();

    let err = registry.dispatch(305, &mut ctx, &[]).unwrap_err();
    assert_eq!(
        err,
        InvokeError::Managed(ManagedError::new(
            "System.InvalidOperationException",
            "fn_c"
        ))
    );
    assert!(ctx.pending.is_none());
    assert_eq!(ctx.depth, 0);
}

#[test]
fn test_stale_pending_error_not_blamed_on_next_call() {
    let registry = IcallRegistry::build(
        [RawEntry::new(1, NativeEntry::AllInteger { arity: 2, func: fn_b }, CallConvention::Wrapped)],
        DispatchConfig::default(),
    )
    .unwrap();
    let mut ctx = RecordingContext::default();
    ctx.set_pending_error(ManagedError::argument("stale"));

    let out = registry
        .dispatch(1, &mut ctx, &[NativeValue::int(0), NativeValue::int(7)])
        .unwrap();
    assert_eq!(out, NativeValue::int(7));
    assert!(ctx.pending.is_none());
    assert_eq!(ctx.depth, 0);
}

#[test]
#[should_panic(expected = "icall token 150 is not in the table")]
fn test_live_call_site_miss_is_fatal() {
    let registry = registry();
    let mut ctx = RecordingContext::default();
    let _ = registry.dispatch(150, &mut ctx, &[]);
}

// ────────────────────────────────────────────────────────────────────────────
// Concurrency
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_concurrent_dispatch() {
    static SLOT: RegistrySlot = RegistrySlot::new();
    let registry = SLOT
        .initialize(registry())
        .expect("slot starts empty");

    std::thread::scope(|scope| {
        for t in 0..8 {
            scope.spawn(move || {
                let mut ctx = RecordingContext::default();
                for i in 0..1000 {
                    let out = registry
                        .dispatch(200, &mut ctx, &[NativeValue::int(t), NativeValue::int(i)])
                        .unwrap();
                    assert_eq!(out, NativeValue::int(t * 10 + i));
                    assert!(registry.resolver().contains(305));
                }
            });
        }
    });

    assert!(SLOT.get().is_some());
}
