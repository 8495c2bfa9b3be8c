//! Options for [`HandlerContainer::add`](crate::HandlerContainer::add).

use crate::id::HandlerId;

/// How and where a handler is inserted.
///
/// `AddOptions::default()` appends the handler so it is invoked first on the
/// next call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    pub(crate) name: Option<String>,
    pub(crate) swap: HandlerId,
    pub(crate) last: bool,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a name to the handler to aid in debugging.
    /// It appears in wrapped errors and in the context's handler stack.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the target handler in place with the new one.
    /// If the target isn't in the container, a normal insertion happens.
    pub fn swap(mut self, target: HandlerId) -> Self {
        self.swap = target;
        self
    }

    /// Inserts the handler so it is invoked last instead of first.
    pub fn last(mut self) -> Self {
        self.last = true;
        self
    }

    pub fn swap_target(&self) -> Option<HandlerId> {
        (!self.swap.is_none()).then_some(self.swap)
    }

    pub fn is_last(&self) -> bool {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_append_without_name() {
        let opts = AddOptions::default();
        assert_eq!(opts.name, None);
        assert_eq!(opts.swap_target(), None);
        assert!(!opts.is_last());
    }

    #[test]
    fn builder_sets_every_field() {
        let opts = AddOptions::new().name("dup").swap(HandlerId::new(12)).last();
        assert_eq!(opts.name.as_deref(), Some("dup"));
        assert_eq!(opts.swap_target(), Some(HandlerId::new(12)));
        assert!(opts.is_last());
    }

    #[test]
    fn swapping_none_is_no_swap() {
        let opts = AddOptions::new().swap(HandlerId::NONE);
        assert_eq!(opts.swap_target(), None);
    }
}
