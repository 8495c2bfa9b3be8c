//! mutableware-core
//!
//! A mutable middleware chain: add, remove and swap handlers while callers
//! keep invoking a single composed entry point.
//!
//! # モジュール構成
//! - **container**: `HandlerContainer` (add / remove / swap, chain compilation)
//! - **handler**: `Handler` trait, continuations, `FnHandler` adapter
//! - **context**: per-call `Context` carrying the active handler stack
//! - **options**: `AddOptions` (name / swap / last)
//! - **error**: `ChainError`, `ErrorKind` sentinels, cause lookup
//! - **id**: `HandlerId`, `HandlerInfo`

pub mod container;
pub mod context;
pub mod error;
pub mod handler;
pub mod id;
pub mod options;

pub use self::container::HandlerContainer;
pub use self::context::{Context, handler_stack};
pub use self::error::{BoxError, ChainError, ErrorKind, find_cause, is_handle_error, is_validate_error};
pub use self::handler::{FnHandler, Handler, Next, ValidateNext};
pub use self::id::{HandlerId, HandlerInfo};
pub use self::options::AddOptions;
