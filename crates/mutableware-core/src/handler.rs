//! Handler trait - a unit of request processing in a chain.
//!
//! Every handler receives `next`, the continuation for "the rest of the chain
//! below me". A handler may
//! - pass the request along (possibly modified) by calling `next`,
//! - transform whatever `next` returns,
//! - short-circuit by returning without calling `next` at all.
//!
//! # Example
//!
//! ```ignore
//! struct AnimalSound {
//!     animal: &'static str,
//!     sound: &'static str,
//! }
//!
//! impl Handler<String, String> for AnimalSound {
//!     fn handle(&self, ctx: &Context, request: String, next: &Next<String, String>) -> Result<String, BoxError> {
//!         if request == self.animal {
//!             return Ok(self.sound.to_string());
//!         }
//!         // not ours, let the older handlers try
//!         next(ctx, request)
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::context::Context;
use crate::error::BoxError;

/// Continuation for `handle`: the rest of the chain.
///
/// It is an `Arc`, so a handler may clone it, call it more than once, or keep
/// it around after returning.
pub type Next<Req, Resp> = Arc<dyn Fn(&Context, Req) -> Result<Resp, BoxError> + Send + Sync>;

/// Continuation for `validate`: the rest of the chain.
pub type ValidateNext<Req> = Arc<dyn Fn(&Context, Req) -> Result<(), BoxError> + Send + Sync>;

/// Handler processes requests of type `Req` into responses of type `Resp`.
///
/// `validate` defaults to passing the request straight to `next`, so a
/// handler that has nothing to check only implements `handle`.
pub trait Handler<Req, Resp>: Send + Sync {
    /// Checks the request without producing a response.
    fn validate(&self, ctx: &Context, request: Req, next: &ValidateNext<Req>) -> Result<(), BoxError> {
        next(ctx, request)
    }

    /// Handles the request.
    fn handle(&self, ctx: &Context, request: Req, next: &Next<Req, Resp>) -> Result<Resp, BoxError>;
}

impl<Req, Resp, H> Handler<Req, Resp> for Arc<H>
where
    H: Handler<Req, Resp> + ?Sized,
{
    fn validate(&self, ctx: &Context, request: Req, next: &ValidateNext<Req>) -> Result<(), BoxError> {
        (**self).validate(ctx, request, next)
    }

    fn handle(&self, ctx: &Context, request: Req, next: &Next<Req, Resp>) -> Result<Resp, BoxError> {
        (**self).handle(ctx, request, next)
    }
}

type ValidateFn<Req> =
    Box<dyn Fn(&Context, Req, &ValidateNext<Req>) -> Result<(), BoxError> + Send + Sync>;

type HandleFn<Req, Resp> =
    Box<dyn Fn(&Context, Req, &Next<Req, Resp>) -> Result<Resp, BoxError> + Send + Sync>;

/// A handler defined by a pair of functions.
///
/// Either function may be left out; a missing one just calls `next`
/// unchanged. Any struct implementing [`Handler`] works just as well, this is
/// only a helper.
///
/// ```ignore
/// let doubler = FnHandler::new()
///     .on_validate(|ctx, n: i64, next| next(ctx, n))
///     .on_handle(|ctx, n: i64, next| next(ctx, n * 2));
/// ```
pub struct FnHandler<Req, Resp> {
    validate_fn: ValidateFn<Req>,
    handle_fn: HandleFn<Req, Resp>,
}

impl<Req: 'static, Resp: 'static> FnHandler<Req, Resp> {
    /// A handler that passes everything through.
    pub fn new() -> Self {
        Self {
            validate_fn: Box::new(pass_validate::<Req>),
            handle_fn: Box::new(pass_handle::<Req, Resp>),
        }
    }

    /// A handler with only a `handle` function.
    pub fn handling<F>(handle_fn: F) -> Self
    where
        F: Fn(&Context, Req, &Next<Req, Resp>) -> Result<Resp, BoxError> + Send + Sync + 'static,
    {
        Self::new().on_handle(handle_fn)
    }

    /// A handler with only a `validate` function.
    pub fn validating<F>(validate_fn: F) -> Self
    where
        F: Fn(&Context, Req, &ValidateNext<Req>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::new().on_validate(validate_fn)
    }

    pub fn on_validate<F>(mut self, validate_fn: F) -> Self
    where
        F: Fn(&Context, Req, &ValidateNext<Req>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.validate_fn = Box::new(validate_fn);
        self
    }

    pub fn on_handle<F>(mut self, handle_fn: F) -> Self
    where
        F: Fn(&Context, Req, &Next<Req, Resp>) -> Result<Resp, BoxError> + Send + Sync + 'static,
    {
        self.handle_fn = Box::new(handle_fn);
        self
    }
}

fn pass_validate<Req>(ctx: &Context, request: Req, next: &ValidateNext<Req>) -> Result<(), BoxError> {
    next(ctx, request)
}

fn pass_handle<Req, Resp>(ctx: &Context, request: Req, next: &Next<Req, Resp>) -> Result<Resp, BoxError> {
    next(ctx, request)
}

impl<Req: 'static, Resp: 'static> Default for FnHandler<Req, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> Handler<Req, Resp> for FnHandler<Req, Resp> {
    fn validate(&self, ctx: &Context, request: Req, next: &ValidateNext<Req>) -> Result<(), BoxError> {
        (self.validate_fn)(ctx, request, next)
    }

    fn handle(&self, ctx: &Context, request: Req, next: &Next<Req, Resp>) -> Result<Resp, BoxError> {
        (self.handle_fn)(ctx, request, next)
    }
}
