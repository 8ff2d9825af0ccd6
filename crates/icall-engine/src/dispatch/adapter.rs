//! Invocation adapter: calls a resolved entry with its convention

use icall_sdk::{
    CallConvention, ManagedContext, MixedSignature, NativeEntry, NativeValue, ReturnKind, Scalar,
    MAX_ARITY,
};

use crate::config::DispatchConfig;
use crate::error::InvokeError;
use crate::table::Entry;

use super::frame::HandleFrame;

/// Applies an entry's calling convention around the native call.
///
/// Stateless apart from configuration; marshaling buffers live on the stack
/// of each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvocationAdapter {
    check_return_kinds: bool,
    trace_calls: bool,
}

impl InvocationAdapter {
    /// Create an adapter from dispatch configuration
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            check_return_kinds: config.check_return_kinds,
            trace_calls: config.trace_calls,
        }
    }

    /// Invoke `entry` with `args`.
    ///
    /// Wrapped entries run inside a handle frame on `ctx` and report managed
    /// errors as [`InvokeError::Managed`]. Raw entries never touch `ctx`.
    pub fn invoke(
        &self,
        entry: &Entry,
        ctx: &mut dyn ManagedContext,
        args: &[NativeValue],
    ) -> Result<NativeValue, InvokeError> {
        let token = entry.token();
        let expected = entry.native().arity();
        if args.len() != expected {
            return Err(InvokeError::Arity {
                token,
                expected,
                got: args.len(),
            });
        }

        if self.trace_calls {
            log::trace!(
                "icall {} ({}, {:?}) with {} arg(s)",
                token,
                entry.convention(),
                entry.native(),
                args.len()
            );
        }

        match entry.convention() {
            CallConvention::Raw => self.call_scalar(entry, args),
            CallConvention::Wrapped => self.call_wrapped(entry, ctx, args),
        }
    }

    fn call_wrapped(
        &self,
        entry: &Entry,
        ctx: &mut dyn ManagedContext,
        args: &[NativeValue],
    ) -> Result<NativeValue, InvokeError> {
        let mut frame = HandleFrame::open(ctx);
        let result = match *entry.native() {
            NativeEntry::Managed { func, .. } => func(frame.ctx(), args).map_err(InvokeError::Managed),
            _ => self.call_scalar(entry, args),
        };
        let pending = frame.close();

        match (result, pending) {
            (Err(err), _) => Err(err),
            (Ok(_), Some(raised)) => Err(InvokeError::Managed(raised)),
            (Ok(value), None) => Ok(value),
        }
    }

    fn call_scalar(&self, entry: &Entry, args: &[NativeValue]) -> Result<NativeValue, InvokeError> {
        let token = entry.token();
        match *entry.native() {
            NativeEntry::AllInteger { func, .. } => {
                let mut buf = [0i32; MAX_ARITY];
                let ints = marshal_ints(token, args, &mut buf)?;
                Ok(NativeValue::int(func(ints)))
            }
            NativeEntry::IntegerVoid { func, .. } => {
                let mut buf = [0i32; MAX_ARITY];
                let ints = marshal_ints(token, args, &mut buf)?;
                func(ints);
                Ok(NativeValue::Void)
            }
            NativeEntry::ReturnsHandle { func, .. } => {
                let mut buf = [0i32; MAX_ARITY];
                let ints = marshal_ints(token, args, &mut buf)?;
                Ok(NativeValue::handle(func(ints)))
            }
            NativeEntry::Mixed { signature, func } => {
                let mut buf = [Scalar::default(); MAX_ARITY];
                let scalars = marshal_scalars(token, signature, args, &mut buf)?;
                let out = func(scalars);
                self.mixed_result(token, signature, out)
            }
            NativeEntry::Managed { .. } => {
                unreachable!("managed entries are rejected for the raw convention at construction")
            }
        }
    }

    fn mixed_result(
        &self,
        token: u32,
        signature: &MixedSignature,
        out: Scalar,
    ) -> Result<NativeValue, InvokeError> {
        match signature.ret {
            ReturnKind::Void => Ok(NativeValue::Void),
            ReturnKind::Scalar(expected) => {
                if self.check_return_kinds && out.kind() != expected {
                    return Err(InvokeError::ReturnKind {
                        token,
                        expected,
                        got: out.kind(),
                    });
                }
                Ok(NativeValue::Scalar(out))
            }
        }
    }
}

fn marshal_ints<'b>(
    token: u32,
    args: &[NativeValue],
    buf: &'b mut [i32; MAX_ARITY],
) -> Result<&'b [i32], InvokeError> {
    for (index, arg) in args.iter().enumerate() {
        buf[index] = arg.as_int().ok_or(InvokeError::ArgumentKind {
            token,
            index,
            expected: "int",
            got: arg.type_name(),
        })?;
    }
    Ok(&buf[..args.len()])
}

fn marshal_scalars<'b>(
    token: u32,
    signature: &MixedSignature,
    args: &[NativeValue],
    buf: &'b mut [Scalar; MAX_ARITY],
) -> Result<&'b [Scalar], InvokeError> {
    for (index, (arg, &kind)) in args.iter().zip(signature.params).enumerate() {
        buf[index] = match arg.as_scalar() {
            Some(s) if s.kind() == kind => s,
            _ => {
                return Err(InvokeError::ArgumentKind {
                    token,
                    index,
                    expected: kind.c_name(),
                    got: arg.type_name(),
                })
            }
        };
    }
    Ok(&buf[..args.len()])
}
