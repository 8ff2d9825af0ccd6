//! Values crossing the icall boundary
//!
//! Two layers:
//! - [`Scalar`]: primitive machine values (native int, 64-bit int, double,
//!   opaque address). The only values a Raw native ever sees.
//! - [`NativeValue`]: what a managed call site supplies and receives. Adds
//!   `Void` and managed object references, which only travel on the Wrapped
//!   path.

use std::fmt;

// ============================================================================
// Opaque references
// ============================================================================

/// Opaque native address or handle (e.g., a `GPtrArray*`, a pinned buffer).
///
/// The dispatch layer never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Handle(pub usize);

impl Handle {
    /// The null handle
    pub const NULL: Handle = Handle(0);

    /// Check if this is the null handle
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Reference to an object on the managed heap.
///
/// Only the engine and Wrapped natives interpret the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectRef(pub u64);

// ============================================================================
// Scalar
// ============================================================================

/// Kind of a primitive scalar slot in a native signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Native integer (`int` in the generated prototypes)
    Int,
    /// 64-bit integer (`int64_t`)
    Long,
    /// Double-precision float (`double`)
    Double,
    /// Opaque address / handle
    Handle,
}

impl ScalarKind {
    /// Name as it appears in a generated C prototype
    pub fn c_name(self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Long => "int64_t",
            ScalarKind::Double => "double",
            ScalarKind::Handle => "void*",
        }
    }

    /// Parse a C prototype type name
    pub fn from_c_name(name: &str) -> Option<Self> {
        match name {
            "int" | "int32_t" => Some(ScalarKind::Int),
            "int64_t" => Some(ScalarKind::Long),
            "double" => Some(ScalarKind::Double),
            "void*" | "gpointer" => Some(ScalarKind::Handle),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

/// A primitive scalar value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Native integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Double-precision float
    Double(f64),
    /// Opaque address
    Handle(Handle),
}

impl Scalar {
    /// Kind of this scalar
    #[inline]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Long(_) => ScalarKind::Long,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::Handle(_) => ScalarKind::Handle,
        }
    }

    /// Get as native integer
    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Scalar::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Get as 64-bit integer
    #[inline]
    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Scalar::Long(i) => Some(i),
            _ => None,
        }
    }

    /// Get as double
    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Scalar::Double(d) => Some(d),
            _ => None,
        }
    }

    /// Get as handle
    #[inline]
    pub fn as_handle(&self) -> Option<Handle> {
        match *self {
            Scalar::Handle(h) => Some(h),
            _ => None,
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Int(0)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Long(i)
    }
}

impl From<f64> for Scalar {
    fn from(d: f64) -> Self {
        Scalar::Double(d)
    }
}

impl From<Handle> for Scalar {
    fn from(h: Handle) -> Self {
        Scalar::Handle(h)
    }
}

// ============================================================================
// NativeValue
// ============================================================================

/// Argument or result of a dispatched call
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NativeValue {
    /// No value (void return)
    #[default]
    Void,
    /// Primitive scalar
    Scalar(Scalar),
    /// Managed object reference (Wrapped path only)
    Object(ObjectRef),
}

impl NativeValue {
    /// Create a native integer value
    #[inline]
    pub const fn int(i: i32) -> Self {
        NativeValue::Scalar(Scalar::Int(i))
    }

    /// Create a 64-bit integer value
    #[inline]
    pub const fn long(i: i64) -> Self {
        NativeValue::Scalar(Scalar::Long(i))
    }

    /// Create a double value
    #[inline]
    pub const fn double(d: f64) -> Self {
        NativeValue::Scalar(Scalar::Double(d))
    }

    /// Create a handle value
    #[inline]
    pub const fn handle(h: Handle) -> Self {
        NativeValue::Scalar(Scalar::Handle(h))
    }

    /// Create an object reference value
    #[inline]
    pub const fn object(r: ObjectRef) -> Self {
        NativeValue::Object(r)
    }

    /// Check if this is `Void`
    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, NativeValue::Void)
    }

    /// Get the scalar payload, if any
    #[inline]
    pub fn as_scalar(&self) -> Option<Scalar> {
        match *self {
            NativeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get as native integer
    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        self.as_scalar().and_then(|s| s.as_int())
    }

    /// Get as 64-bit integer
    #[inline]
    pub fn as_long(&self) -> Option<i64> {
        self.as_scalar().and_then(|s| s.as_long())
    }

    /// Get as double
    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        self.as_scalar().and_then(|s| s.as_double())
    }

    /// Get as handle
    #[inline]
    pub fn as_handle(&self) -> Option<Handle> {
        self.as_scalar().and_then(|s| s.as_handle())
    }

    /// Get as object reference
    #[inline]
    pub fn as_object(&self) -> Option<ObjectRef> {
        match *self {
            NativeValue::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Short type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            NativeValue::Void => "void",
            NativeValue::Scalar(s) => s.kind().c_name(),
            NativeValue::Object(_) => "object",
        }
    }
}

impl From<Scalar> for NativeValue {
    fn from(s: Scalar) -> Self {
        NativeValue::Scalar(s)
    }
}

impl From<ObjectRef> for NativeValue {
    fn from(r: ObjectRef) -> Self {
        NativeValue::Object(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Scalar::Int(7).as_int(), Some(7));
        assert_eq!(Scalar::Int(7).as_long(), None);
        assert_eq!(Scalar::Long(1 << 40).as_long(), Some(1 << 40));
        assert_eq!(Scalar::Double(2.5).as_double(), Some(2.5));
        assert_eq!(Scalar::Handle(Handle(0x10)).as_handle(), Some(Handle(0x10)));
    }

    #[test]
    fn test_scalar_kind_c_names() {
        for kind in [
            ScalarKind::Int,
            ScalarKind::Long,
            ScalarKind::Double,
            ScalarKind::Handle,
        ] {
            assert_eq!(ScalarKind::from_c_name(kind.c_name()), Some(kind));
        }
        assert_eq!(ScalarKind::from_c_name("void"), None);
        assert_eq!(ScalarKind::from_c_name("float"), None);
    }

    #[test]
    fn test_native_value_type_names() {
        assert_eq!(NativeValue::Void.type_name(), "void");
        assert_eq!(NativeValue::int(1).type_name(), "int");
        assert_eq!(NativeValue::double(1.0).type_name(), "double");
        assert_eq!(NativeValue::object(ObjectRef(3)).type_name(), "object");
    }

    #[test]
    fn test_object_is_not_scalar() {
        let v = NativeValue::object(ObjectRef(9));
        assert_eq!(v.as_scalar(), None);
        assert_eq!(v.as_object(), Some(ObjectRef(9)));
        assert!(Handle::NULL.is_null());
    }
}
