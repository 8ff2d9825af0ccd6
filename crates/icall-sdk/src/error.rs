//! Error types shared by natives and the dispatch engine

/// Result type for natives that may raise a managed-level error
pub type ManagedResult<T> = Result<T, ManagedError>;

/// A managed-level exception raised by a native routine.
///
/// The dispatch engine never inspects or rewrites this value; it is carried
/// back to the caller exactly as the native produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ManagedError {
    /// Exception class name (e.g., "System.ArgumentNullException")
    pub kind: String,
    /// Human readable message
    pub message: String,
}

impl ManagedError {
    /// Create a new managed error
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ManagedError {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new("System.ArgumentException", message)
    }

    /// Shorthand for a null reference error
    pub fn null_reference(message: impl Into<String>) -> Self {
        Self::new("System.NullReferenceException", message)
    }
}

impl From<String> for ManagedError {
    fn from(s: String) -> Self {
        ManagedError::new("System.Exception", s)
    }
}

impl From<&str> for ManagedError {
    fn from(s: &str) -> Self {
        ManagedError::new("System.Exception", s)
    }
}
