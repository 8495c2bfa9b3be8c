//! Handler identifiers and diagnostic metadata.
//!
//! `HandlerId` は container 内で一意。削除されても再利用しない。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one handler instance inside one [`HandlerContainer`].
///
/// Retain the ID returned by `add` if you want to `remove` or swap the
/// handler later. `HandlerId::default()` is [`HandlerId::NONE`].
///
/// [`HandlerContainer`]: crate::HandlerContainer
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Reserved "no target" value. Never assigned to a handler.
    pub const NONE: HandlerId = HandlerId(0);

    /// The first ID a fresh container hands out.
    pub const FIRST: HandlerId = HandlerId(10);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// The ID that follows this one.
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for HandlerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for a handler: its ID and an optional human-readable name.
///
/// Shows up in wrapped errors and in the handler stack of a [`Context`].
///
/// [`Context`]: crate::Context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerInfo {
    pub id: HandlerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl HandlerInfo {
    pub fn new(id: HandlerId, name: Option<String>) -> Self {
        Self { id, name }
    }

    pub fn named(id: HandlerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    pub fn unnamed(id: HandlerId) -> Self {
        Self { id, name: None }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for HandlerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}({})", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}
