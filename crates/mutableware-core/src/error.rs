//! Chain-level errors.
//!
//! Handlers return [`BoxError`]. When an error leaves a handler for the first
//! time it is wrapped in a [`ChainError`] carrying the failing handler's
//! [`HandlerInfo`]. Outer handlers that only pass it along do not wrap it
//! again, so the attribution always points at the innermost failure.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::id::HandlerInfo;

/// Error type handlers return and continuations yield.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Category of a chain-level error.
///
/// Works like a sentinel: use [`ErrorKind::matches`] to test whether any
/// error (possibly wrapped further by caller code) belongs to the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Returned by a handler's `validate`.
    Validation,
    /// Returned by a handler's `handle`.
    Handling,
}

impl ErrorKind {
    /// True if `err`, or anything in its `source()` chain, is a
    /// [`ChainError`] of this kind.
    pub fn matches(self, err: &(dyn StdError + 'static)) -> bool {
        chain_iter(err)
            .filter_map(|e| e.downcast_ref::<ChainError>())
            .any(|chain| chain.kind == self)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => f.write_str("validateError"),
            ErrorKind::Handling => f.write_str("handleError"),
        }
    }
}

/// An error attributed to the handler that produced it.
#[derive(Debug, Error)]
#[error("{kind} handler={handler} {source}")]
pub struct ChainError {
    kind: ErrorKind,
    handler: HandlerInfo,
    #[source]
    source: BoxError,
}

impl ChainError {
    pub fn new(kind: ErrorKind, handler: HandlerInfo, source: BoxError) -> Self {
        Self {
            kind,
            handler,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The handler the error is attributed to.
    pub fn handler(&self) -> &HandlerInfo {
        &self.handler
    }

    /// The error the handler originally returned.
    pub fn original(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub fn into_original(self) -> BoxError {
        self.source
    }
}

/// Tags `err` with `kind` and `handler` unless it already carries `kind`.
pub(crate) fn attribute(kind: ErrorKind, handler: &HandlerInfo, err: BoxError) -> BoxError {
    if kind.matches(&*err) {
        return err;
    }
    tracing::trace!(%handler, %kind, "attributing handler error");
    Box::new(ChainError::new(kind, handler.clone(), err))
}

/// Walks `err` and its `source()` chain and returns the first `E` found.
pub fn find_cause<'a, E>(err: &'a (dyn StdError + 'static)) -> Option<&'a E>
where
    E: StdError + 'static,
{
    chain_iter(err).find_map(|e| e.downcast_ref::<E>())
}

/// True if `err` is a handling failure produced by a chain.
pub fn is_handle_error(err: &(dyn StdError + 'static)) -> bool {
    ErrorKind::Handling.matches(err)
}

/// True if `err` is a validation failure produced by a chain.
pub fn is_validate_error(err: &(dyn StdError + 'static)) -> bool {
    ErrorKind::Validation.matches(err)
}

fn chain_iter<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |e| (*e).source())
}
