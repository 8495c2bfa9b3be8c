//! HandlerContainer - a mutable middleware chain.
//!
//! Handlers can be added, removed and swapped after construction. Every
//! mutation recompiles the chain into one composed callable per operation
//! (`validate`, `handle`), so invocation never walks the handler list.
//!
//! # Invocation order
//! Handlers run in the reverse order they were added: the newest handler is
//! outermost and decides whether to call into the older ones. A handler added
//! with [`AddOptions::last`] runs after everything else.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::context::Context;
use crate::error::{BoxError, ErrorKind, attribute};
use crate::handler::{FnHandler, Handler, Next, ValidateNext};
use crate::id::{HandlerId, HandlerInfo};
use crate::options::AddOptions;

/// A handler plus the info used to remove it and to attribute its errors.
struct IdentifiedHandler<Req, Resp> {
    handler: Arc<dyn Handler<Req, Resp>>,
    info: Arc<HandlerInfo>,
}

impl<Req, Resp> Clone for IdentifiedHandler<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            info: Arc::clone(&self.info),
        }
    }
}

/// Where `add` put the new handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Swapped,
    First,
    Last,
}

/// State guarded by the container's lock.
///
/// `validate` / `handle` are always compiled from the current `stack`.
struct Chain<Req, Resp> {
    /// Oldest first.
    stack: Vec<IdentifiedHandler<Req, Resp>>,
    next_id: HandlerId,
    validate: ValidateNext<Req>,
    handle: Next<Req, Resp>,
}

impl<Req, Resp> Chain<Req, Resp>
where
    Req: 'static,
    Resp: Default + 'static,
{
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            next_id: HandlerId::FIRST,
            validate: Arc::new(nop_validate::<Req>),
            handle: Arc::new(nop_handle::<Req, Resp>),
        }
    }

    fn allocate_id(&mut self) -> HandlerId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    fn position(&self, id: HandlerId) -> Option<usize> {
        self.stack.iter().position(|entry| entry.info.id == id)
    }

    fn insert(&mut self, entry: IdentifiedHandler<Req, Resp>, options: &AddOptions) -> Placement {
        if let Some(target) = options.swap_target()
            && let Some(idx) = self.position(target)
        {
            self.stack[idx] = entry;
            return Placement::Swapped;
        }

        if options.last {
            self.stack.insert(0, entry);
            Placement::Last
        } else {
            self.stack.push(entry);
            Placement::First
        }
    }

    /// Folds the stack, oldest first, into the composed callables.
    ///
    /// Each step wraps the chain built so far, so the newest handler ends up
    /// outermost.
    fn rebuild(&mut self) {
        let mut validate: ValidateNext<Req> = Arc::new(nop_validate::<Req>);
        let mut handle: Next<Req, Resp> = Arc::new(nop_handle::<Req, Resp>);

        for entry in &self.stack {
            validate = wrap_validate(entry.clone(), validate);
            handle = wrap_handle(entry.clone(), handle);
        }

        self.validate = validate;
        self.handle = handle;
        trace!(len = self.stack.len(), "handler chain rebuilt");
    }
}

fn wrap_validate<Req, Resp>(
    entry: IdentifiedHandler<Req, Resp>,
    inner: ValidateNext<Req>,
) -> ValidateNext<Req>
where
    Req: 'static,
    Resp: 'static,
{
    Arc::new(move |ctx: &Context, request: Req| {
        let handler_ctx = ctx.with_shared_handler(Arc::clone(&entry.info));
        entry
            .handler
            .validate(&handler_ctx, request, &inner)
            .map_err(|err| attribute(ErrorKind::Validation, &entry.info, err))
    })
}

fn wrap_handle<Req, Resp>(entry: IdentifiedHandler<Req, Resp>, inner: Next<Req, Resp>) -> Next<Req, Resp>
where
    Req: 'static,
    Resp: 'static,
{
    Arc::new(move |ctx: &Context, request: Req| {
        let handler_ctx = ctx.with_shared_handler(Arc::clone(&entry.info));
        entry
            .handler
            .handle(&handler_ctx, request, &inner)
            .map_err(|err| attribute(ErrorKind::Handling, &entry.info, err))
    })
}

// 終端: 何もしない
fn nop_validate<Req>(_ctx: &Context, _request: Req) -> Result<(), BoxError> {
    Ok(())
}

fn nop_handle<Req, Resp: Default>(_ctx: &Context, _request: Req) -> Result<Resp, BoxError> {
    Ok(Resp::default())
}

/// An ordered, mutable collection of handlers of the same type.
///
/// `validate` and `handle` run the chain under a shared lock and may run
/// concurrently from many threads. `add` and `remove` take the exclusive lock
/// and recompile the chain before releasing it, so every call runs either the
/// whole chain before a mutation or the whole chain after it, and a handler
/// is no longer running once `remove` has returned.
///
/// Handlers must not `add` or `remove` on the container they are running in:
/// the exclusive lock waits for the call that holds the shared one.
///
/// # Example
///
/// ```ignore
/// let container = HandlerContainer::<String, String>::new();
///
/// // catch-all, runs last
/// container.add_fn(|_ctx, animal, _next| Err(format!("unknown animal {animal}").into()), AddOptions::default());
/// let duck = container.add(AnimalSound::new("duck", "quack"), AddOptions::new().name("duck"));
///
/// assert_eq!(container.handle(&Context::new(), "duck".into())?, "quack");
///
/// // make ducks bark instead, same position in the chain
/// container.add(AnimalSound::new("duck", "bark"), AddOptions::new().swap(duck));
/// container.remove(duck); // no-op: the swapped-out handler is already gone
/// ```
pub struct HandlerContainer<Req, Resp> {
    chain: RwLock<Chain<Req, Resp>>,
}

impl<Req, Resp> HandlerContainer<Req, Resp>
where
    Req: 'static,
    Resp: Default + 'static,
{
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            chain: RwLock::new(Chain::new()),
        }
    }

    /// Adds a handler. Newer handlers are invoked first unless
    /// [`AddOptions::last`] is set.
    ///
    /// Retain the returned ID if you need to `remove` or swap this handler later.
    pub fn add<H>(&self, handler: H, options: AddOptions) -> HandlerId
    where
        H: Handler<Req, Resp> + 'static,
    {
        let mut chain = self.chain.write();

        let id = chain.allocate_id();
        let entry = IdentifiedHandler {
            handler: Arc::new(handler),
            info: Arc::new(HandlerInfo::new(id, options.name.clone())),
        };

        let placement = chain.insert(entry, &options);
        chain.rebuild();

        debug!(
            handler_id = %id,
            name = options.name.as_deref().unwrap_or(""),
            ?placement,
            swap_target = ?options.swap_target(),
            len = chain.stack.len(),
            "handler added"
        );
        id
    }

    /// Adds a handler built from a bare `handle` function.
    pub fn add_fn<F>(&self, handle_fn: F, options: AddOptions) -> HandlerId
    where
        F: Fn(&Context, Req, &Next<Req, Resp>) -> Result<Resp, BoxError> + Send + Sync + 'static,
    {
        self.add(FnHandler::handling(handle_fn), options)
    }

    /// Removes a handler that was previously added.
    ///
    /// Removing an unknown ID does nothing.
    pub fn remove(&self, id: HandlerId) {
        let mut chain = self.chain.write();

        let before = chain.stack.len();
        chain.stack.retain(|entry| entry.info.id != id);
        let removed = before - chain.stack.len();
        if removed == 0 {
            debug!(handler_id = %id, "remove: handler not present");
            return;
        }

        chain.rebuild();
        debug!(handler_id = %id, removed, len = chain.stack.len(), "handler removed");
    }

    /// Runs the `validate` chain. Handlers added latest run first.
    pub fn validate(&self, ctx: &Context, request: Req) -> Result<(), BoxError> {
        let chain = self.chain.read();
        (chain.validate)(ctx, request)
    }

    /// Runs the `handle` chain. Handlers added latest run first.
    ///
    /// An empty container returns `Resp::default()`.
    pub fn handle(&self, ctx: &Context, request: Req) -> Result<Resp, BoxError> {
        let chain = self.chain.read();
        (chain.handle)(ctx, request)
    }

    /// Handler info in invocation order (the first one runs first).
    pub fn handlers(&self) -> Vec<HandlerInfo> {
        self.chain
            .read()
            .stack
            .iter()
            .rev()
            .map(|entry| HandlerInfo::clone(&entry.info))
            .collect()
    }

    pub fn contains(&self, id: HandlerId) -> bool {
        self.chain.read().position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.chain.read().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.read().stack.is_empty()
    }
}

impl<Req, Resp> Default for HandlerContainer<Req, Resp>
where
    Req: 'static,
    Resp: Default + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> fmt::Debug for HandlerContainer<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self.chain.read();
        let handlers: Vec<&HandlerInfo> = chain.stack.iter().rev().map(|e| &*e.info).collect();
        f.debug_struct("HandlerContainer")
            .field("handlers", &handlers)
            .field("next_id", &chain.next_id)
            .finish()
    }
}
