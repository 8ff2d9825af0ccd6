//! Native entry points and calling conventions
//!
//! [`NativeEntry`] is a closed tagged union over the native signatures the
//! dispatch table supports. The variant fixes how arguments are marshaled, so
//! the shape of a routine is checked once at registration instead of being
//! trusted at every call.

use std::fmt;

use crate::context::ManagedContext;
use crate::error::ManagedResult;
use crate::value::{Handle, NativeValue, Scalar, ScalarKind};

/// Maximum number of parameters any native may declare.
///
/// Also the size of the per-call marshaling buffers.
pub const MAX_ARITY: usize = 8;

// ============================================================================
// Calling convention
// ============================================================================

/// Flag byte for the Wrapped convention
pub const FLAG_WRAPPED: u8 = 0;
/// Flag byte for the Raw convention
pub const FLAG_RAW: u8 = 4;

/// Calling convention selected by an entry's flag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallConvention {
    /// Managed values allowed; errors propagate back to the caller
    Wrapped,
    /// Primitive scalars only; no managed error path
    Raw,
}

impl CallConvention {
    /// Flag byte as stored in generated tables
    #[inline]
    pub const fn flag(self) -> u8 {
        match self {
            CallConvention::Wrapped => FLAG_WRAPPED,
            CallConvention::Raw => FLAG_RAW,
        }
    }
}

impl TryFrom<u8> for CallConvention {
    type Error = u8;

    /// Only the two observed flag values are accepted; anything else is
    /// returned as the error.
    fn try_from(flag: u8) -> Result<Self, u8> {
        match flag {
            FLAG_WRAPPED => Ok(CallConvention::Wrapped),
            FLAG_RAW => Ok(CallConvention::Raw),
            other => Err(other),
        }
    }
}

impl fmt::Display for CallConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallConvention::Wrapped => f.write_str("wrapped"),
            CallConvention::Raw => f.write_str("raw"),
        }
    }
}

// ============================================================================
// Signatures
// ============================================================================

/// Return slot of a native signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// No return value
    Void,
    /// Returns a scalar
    Scalar(ScalarKind),
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnKind::Void => f.write_str("void"),
            ReturnKind::Scalar(k) => write!(f, "{}", k),
        }
    }
}

/// Declared scalar signature of a native routine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Parameter kinds in call order
    pub params: Vec<ScalarKind>,
    /// Return kind
    pub ret: ReturnKind,
}

impl Signature {
    /// Create a signature
    pub fn new(params: impl Into<Vec<ScalarKind>>, ret: ReturnKind) -> Self {
        Signature {
            params: params.into(),
            ret,
        }
    }

    /// `int f(int, ..., int)` with `arity` params
    pub fn all_int(arity: usize) -> Self {
        Self::new(vec![ScalarKind::Int; arity], ReturnKind::Scalar(ScalarKind::Int))
    }

    /// `void f(int, ..., int)` with `arity` params
    pub fn int_void(arity: usize) -> Self {
        Self::new(vec![ScalarKind::Int; arity], ReturnKind::Void)
    }

    /// Number of parameters
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Classify this signature
    pub fn class(&self) -> SignatureClass {
        let all_int = self.params.iter().all(|k| *k == ScalarKind::Int);
        match self.ret {
            ReturnKind::Scalar(ScalarKind::Handle) if all_int => SignatureClass::ReturnsHandle,
            ReturnKind::Void | ReturnKind::Scalar(ScalarKind::Int) if all_int => {
                SignatureClass::AllInteger
            }
            _ => SignatureClass::Mixed,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.ret)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")
    }
}

/// Coarse signature class, used for reporting and table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignatureClass {
    /// Native-int params, native-int or void result
    AllInteger,
    /// Any mix of int / int64 / double / handle
    Mixed,
    /// Native-int params, handle result
    ReturnsHandle,
    /// Receives the managed context and managed values
    Managed,
}

impl fmt::Display for SignatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignatureClass::AllInteger => "all-integer",
            SignatureClass::Mixed => "mixed",
            SignatureClass::ReturnsHandle => "returns-handle",
            SignatureClass::Managed => "managed",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Native entry
// ============================================================================

/// `int f(int...)`
pub type AllIntegerFn = fn(args: &[i32]) -> i32;
/// `void f(int...)`
pub type IntegerVoidFn = fn(args: &[i32]);
/// Any scalar mix; the declared [`Signature`] describes the slots
pub type MixedFn = fn(args: &[Scalar]) -> Scalar;
/// `handle f(int...)`
pub type ReturnsHandleFn = fn(args: &[i32]) -> Handle;
/// Managed-aware routine; may raise by returning `Err`
pub type ManagedFn = fn(ctx: &mut dyn ManagedContext, args: &[NativeValue]) -> ManagedResult<NativeValue>;

/// A native entry point with its statically known shape.
///
/// Function pointers are never null, so a `NativeEntry` always refers to a
/// callable routine; a missing entry is modeled as `Option::None` by the
/// table producer.
#[derive(Clone, Copy)]
pub enum NativeEntry {
    /// Native-int params, native-int result
    AllInteger {
        /// Parameter count
        arity: u8,
        /// Entry point
        func: AllIntegerFn,
    },
    /// Native-int params, no result
    IntegerVoid {
        /// Parameter count
        arity: u8,
        /// Entry point
        func: IntegerVoidFn,
    },
    /// Mixed scalar params and result
    Mixed {
        /// Declared parameter and return kinds
        signature: &'static MixedSignature,
        /// Entry point
        func: MixedFn,
    },
    /// Native-int params, handle result
    ReturnsHandle {
        /// Parameter count
        arity: u8,
        /// Entry point
        func: ReturnsHandleFn,
    },
    /// Managed values in and out (Wrapped convention only)
    Managed {
        /// Parameter count
        arity: u8,
        /// Entry point
        func: ManagedFn,
    },
}

/// Static signature for [`NativeEntry::Mixed`].
///
/// Kept `'static` so entries stay `Copy` and can be declared in `const`
/// tables.
#[derive(Debug, PartialEq, Eq)]
pub struct MixedSignature {
    /// Parameter kinds
    pub params: &'static [ScalarKind],
    /// Return kind
    pub ret: ReturnKind,
}

impl MixedSignature {
    /// Convert to an owned [`Signature`]
    pub fn to_signature(&self) -> Signature {
        Signature::new(self.params.to_vec(), self.ret)
    }
}

impl NativeEntry {
    /// Number of parameters the routine takes
    pub fn arity(&self) -> usize {
        match self {
            NativeEntry::AllInteger { arity, .. }
            | NativeEntry::IntegerVoid { arity, .. }
            | NativeEntry::ReturnsHandle { arity, .. }
            | NativeEntry::Managed { arity, .. } => *arity as usize,
            NativeEntry::Mixed { signature, .. } => signature.params.len(),
        }
    }

    /// Signature class of this entry
    pub fn class(&self) -> SignatureClass {
        match self {
            NativeEntry::AllInteger { .. } | NativeEntry::IntegerVoid { .. } => {
                SignatureClass::AllInteger
            }
            NativeEntry::Mixed { .. } => SignatureClass::Mixed,
            NativeEntry::ReturnsHandle { .. } => SignatureClass::ReturnsHandle,
            NativeEntry::Managed { .. } => SignatureClass::Managed,
        }
    }

    /// Scalar signature, or `None` for managed routines
    pub fn signature(&self) -> Option<Signature> {
        let n = self.arity();
        match self {
            NativeEntry::AllInteger { .. } => Some(Signature::all_int(n)),
            NativeEntry::IntegerVoid { .. } => Some(Signature::int_void(n)),
            NativeEntry::Mixed { signature, .. } => Some(signature.to_signature()),
            NativeEntry::ReturnsHandle { .. } => Some(Signature::new(
                vec![ScalarKind::Int; n],
                ReturnKind::Scalar(ScalarKind::Handle),
            )),
            NativeEntry::Managed { .. } => None,
        }
    }

    /// Whether the routine may be dispatched with `convention`
    pub fn supports(&self, convention: CallConvention) -> bool {
        match convention {
            CallConvention::Wrapped => true,
            CallConvention::Raw => !matches!(self, NativeEntry::Managed { .. }),
        }
    }
}

impl fmt::Debug for NativeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signature() {
            Some(sig) => write!(f, "NativeEntry::{}({})", self.class(), sig),
            None => write!(f, "NativeEntry::managed(arity={})", self.arity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(args: &[i32]) -> i32 {
        args[0] + args[1]
    }

    fn pow(args: &[Scalar]) -> Scalar {
        let a = args[0].as_double().unwrap_or_default();
        let b = args[1].as_double().unwrap_or_default();
        Scalar::Double(a.powf(b))
    }

    static POW_SIG: MixedSignature = MixedSignature {
        params: &[ScalarKind::Double, ScalarKind::Double],
        ret: ReturnKind::Scalar(ScalarKind::Double),
    };

    fn clone_obj(_ctx: &mut dyn ManagedContext, args: &[NativeValue]) -> ManagedResult<NativeValue> {
        Ok(args[0])
    }

    #[test]
    fn test_convention_flags() {
        assert_eq!(CallConvention::try_from(0), Ok(CallConvention::Wrapped));
        assert_eq!(CallConvention::try_from(4), Ok(CallConvention::Raw));
        assert_eq!(CallConvention::try_from(1), Err(1));
        assert_eq!(CallConvention::try_from(8), Err(8));
        assert_eq!(CallConvention::Raw.flag(), FLAG_RAW);
    }

    #[test]
    fn test_entry_signatures() {
        let e = NativeEntry::AllInteger { arity: 2, func: add };
        assert_eq!(e.arity(), 2);
        assert_eq!(e.class(), SignatureClass::AllInteger);
        assert_eq!(e.signature(), Some(Signature::all_int(2)));

        let m = NativeEntry::Mixed {
            signature: &POW_SIG,
            func: pow,
        };
        assert_eq!(m.arity(), 2);
        assert_eq!(m.class(), SignatureClass::Mixed);
        assert_eq!(m.signature().map(|s| s.to_string()).as_deref(), Some("double (double,double)"));
    }

    #[test]
    fn test_managed_entry_is_wrapped_only() {
        let e = NativeEntry::Managed {
            arity: 1,
            func: clone_obj,
        };
        assert!(e.supports(CallConvention::Wrapped));
        assert!(!e.supports(CallConvention::Raw));
        assert_eq!(e.signature(), None);
    }

    #[test]
    fn test_signature_class() {
        assert_eq!(Signature::all_int(3).class(), SignatureClass::AllInteger);
        assert_eq!(Signature::int_void(0).class(), SignatureClass::AllInteger);
        let tick = Signature::new(vec![], ReturnKind::Scalar(ScalarKind::Long));
        assert_eq!(tick.class(), SignatureClass::Mixed);
        let h = Signature::new(vec![ScalarKind::Int], ReturnKind::Scalar(ScalarKind::Handle));
        assert_eq!(h.class(), SignatureClass::ReturnsHandle);
    }
}
