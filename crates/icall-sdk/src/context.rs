//! ManagedContext trait, the engine side of a Wrapped call
//!
//! The execution engine implements this trait once per thread. The
//! invocation adapter drives it around every Wrapped call; Raw calls never
//! touch it.

use crate::error::ManagedError;

/// Position of the handle stack when a frame was opened.
///
/// Returned by [`ManagedContext::push_handle_frame`] and handed back to
/// [`ManagedContext::pop_handle_frame`] so the engine can release every
/// handle the native created during the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMark(pub usize);

/// Abstract engine context for Wrapped natives.
///
/// Natives that need managed services (allocation, raising) receive
/// `&mut dyn ManagedContext`; the dispatch engine only uses the frame and
/// pending-error methods.
pub trait ManagedContext {
    /// Open a handle frame scoped to one Wrapped call
    fn push_handle_frame(&mut self) -> FrameMark;

    /// Release every handle created since `mark`
    fn pop_handle_frame(&mut self, mark: FrameMark);

    /// Record a managed error to be raised when the current call returns.
    ///
    /// Only `Managed` natives and engine services running inside the call
    /// can raise this way; scalar-shaped natives never see the context. The
    /// adapter clears the slot when it opens the call's handle frame.
    fn set_pending_error(&mut self, error: ManagedError);

    /// Take the pending managed error, if any
    fn take_pending_error(&mut self) -> Option<ManagedError>;
}

/// A context with no managed heap.
///
/// Useful for hosts that only dispatch Raw entries, and for tools.
#[derive(Debug, Default)]
pub struct DetachedContext {
    depth: usize,
    pending: Option<ManagedError>,
}

impl DetachedContext {
    /// Create a new detached context
    pub fn new() -> Self {
        Self::default()
    }

    /// Current handle frame depth
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl ManagedContext for DetachedContext {
    fn push_handle_frame(&mut self) -> FrameMark {
        let mark = FrameMark(self.depth);
        self.depth += 1;
        mark
    }

    fn pop_handle_frame(&mut self, mark: FrameMark) {
        self.depth = mark.0;
    }

    fn set_pending_error(&mut self, error: ManagedError) {
        self.pending = Some(error);
    }

    fn take_pending_error(&mut self) -> Option<ManagedError> {
        self.pending.take()
    }
}
