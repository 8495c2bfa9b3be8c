//! Request context threaded through every handler call.
//!
//! A [`Context`] carries the stack of handlers that are active for the
//! current call. Entering a handler extends the stack; the extension is a new
//! value, so sibling calls (and concurrent calls through the same chain) never
//! observe each other's frames.
//!
//! # Example
//!
//! ```ignore
//! let handler = FnHandler::handling(|ctx: &Context, req: String, next: Next<String, String>| {
//!     for info in ctx.handler_stack() {
//!         println!("active: {info}");
//!     }
//!     next(ctx, req)
//! });
//! ```

use std::sync::Arc;

use crate::id::HandlerInfo;

/// One entered handler. Frames are shared, never mutated.
#[derive(Debug)]
struct Frame {
    info: Arc<HandlerInfo>,
    parent: Option<Arc<Frame>>,
    depth: usize,
}

/// Per-call context.
///
/// `Context` is `Clone` and cheap to clone: it is a pointer to an immutable,
/// persistent list of frames.
#[derive(Debug, Clone, Default)]
pub struct Context {
    top: Option<Arc<Frame>>,
}

impl Context {
    /// A context with an empty handler stack.
    pub fn new() -> Self {
        Self { top: None }
    }

    /// Returns a derived context whose stack is this one's plus `info`.
    ///
    /// `self` is left untouched.
    pub fn with_handler(&self, info: HandlerInfo) -> Context {
        self.with_shared_handler(Arc::new(info))
    }

    pub(crate) fn with_shared_handler(&self, info: Arc<HandlerInfo>) -> Context {
        let depth = self.depth() + 1;
        Context {
            top: Some(Arc::new(Frame {
                info,
                parent: self.top.clone(),
                depth,
            })),
        }
    }

    /// The handler stack for this call. The latest handler entered is last.
    pub fn handler_stack(&self) -> Vec<HandlerInfo> {
        let mut stack = Vec::with_capacity(self.depth());
        let mut cursor = self.top.as_deref();
        while let Some(frame) = cursor {
            stack.push(HandlerInfo::clone(&frame.info));
            cursor = frame.parent.as_deref();
        }
        stack.reverse();
        stack
    }

    /// The innermost handler currently entered, if any.
    pub fn current_handler(&self) -> Option<&HandlerInfo> {
        self.top.as_deref().map(|frame| frame.info.as_ref())
    }

    /// Number of handlers on the stack.
    pub fn depth(&self) -> usize {
        self.top.as_ref().map_or(0, |frame| frame.depth)
    }
}

/// Returns the current stack of handlers for a request.
///
/// Same as [`Context::handler_stack`]; an empty `Vec` when no handler has been
/// entered.
pub fn handler_stack(ctx: &Context) -> Vec<HandlerInfo> {
    ctx.handler_stack()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::HandlerId;

    fn info(id: u64, name: &str) -> HandlerInfo {
        HandlerInfo::named(HandlerId::new(id), name)
    }

    #[test]
    fn fresh_context_has_empty_stack() {
        let ctx = Context::new();
        assert!(ctx.handler_stack().is_empty());
        assert!(handler_stack(&Context::default()).is_empty());
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.current_handler().is_none());
    }

    #[test]
    fn extension_appends_latest_last() {
        let ctx = Context::new()
            .with_handler(info(11, "b"))
            .with_handler(info(10, "a"));

        assert_eq!(ctx.handler_stack(), vec![info(11, "b"), info(10, "a")]);
        assert_eq!(ctx.current_handler(), Some(&info(10, "a")));
        assert_eq!(ctx.depth(), 2);
    }

    #[test]
    fn extension_does_not_touch_parent_or_siblings() {
        let parent = Context::new().with_handler(info(10, "root"));
        let left = parent.with_handler(info(11, "left"));
        let right = parent.with_handler(info(12, "right"));

        assert_eq!(parent.handler_stack(), vec![info(10, "root")]);
        assert_eq!(left.handler_stack(), vec![info(10, "root"), info(11, "left")]);
        assert_eq!(right.handler_stack(), vec![info(10, "root"), info(12, "right")]);
    }

    #[test]
    fn context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Context>();
    }
}
