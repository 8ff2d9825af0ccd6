//! Handle frame guard for Wrapped calls

use icall_sdk::{FrameMark, ManagedContext, ManagedError};

/// Handle frame opened around one Wrapped call.
///
/// Dropping the guard pops the frame, so handles are released on every exit
/// path including unwinding out of the native. Opening the frame clears any
/// error left pending before the call; only errors raised inside the frame
/// are reported by [`HandleFrame::close`].
pub(crate) struct HandleFrame<'c> {
    ctx: &'c mut dyn ManagedContext,
    mark: FrameMark,
}

impl<'c> HandleFrame<'c> {
    pub(crate) fn open(ctx: &'c mut dyn ManagedContext) -> Self {
        let mark = ctx.push_handle_frame();
        if let Some(stale) = ctx.take_pending_error() {
            log::warn!("discarding managed error pending before icall: {}", stale);
        }
        Self { ctx, mark }
    }

    pub(crate) fn ctx(&mut self) -> &mut dyn ManagedContext {
        &mut *self.ctx
    }

    /// Drain the pending error, then pop the frame
    pub(crate) fn close(self) -> Option<ManagedError> {
        self.ctx.take_pending_error()
    }
}

impl Drop for HandleFrame<'_> {
    fn drop(&mut self) {
        self.ctx.pop_handle_frame(self.mark);
    }
}
