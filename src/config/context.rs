// Per-parse context: a live `Configuration` plus the typed store that lets
// built-in modifier families keep state without module-level globals
// (spec §3 `ParseContext`, §9 design note).

use crate::ast::LocationRange;
use crate::config::Configuration;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_TOKEN: AtomicUsize = AtomicUsize::new(0);

/// An opaque identity, minted once per subsystem (notes, the shorthand
/// definition stack, counters, ...) and compared by identity rather than
/// name, so two subsystems can't accidentally collide on a string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextToken(usize);

impl ContextToken {
    pub fn new() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ContextToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusively owned by one `Parser` instance for the lifetime of a parse
/// (spec §5). Renderer state is a separate, unrelated concept (`RenderState`).
pub struct ParseContext {
    pub configuration: Configuration,
    /// Counter of enclosing `delayContentExpansion` modifiers; positive
    /// means only `alwaysTryExpand` definitions run their `expand` hook
    /// immediately (spec §4.3 "Delay discipline").
    pub delay_depth: u32,
    /// Stack of expansion-site locations, pushed before reparsing an
    /// expansion and popped after, so messages raised during reparse can be
    /// wrapped as `Message::Referred` (spec's expansion pseudocode).
    pub referral_stack: Vec<LocationRange>,
    store: HashMap<usize, Box<dyn Any>>,
}

impl ParseContext {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            delay_depth: 0,
            referral_stack: Vec::new(),
            store: HashMap::new(),
        }
    }

    pub fn init<T: Any>(&mut self, token: ContextToken, payload: T) {
        self.store.insert(token.0, Box::new(payload));
    }

    /// Fetches the payload registered under `token`. Only fails if a
    /// payload was registered under this token with a different `T` than
    /// requested — a host programming error, reported as `anyhow::Error`
    /// rather than silently returning `None` (see SPEC_FULL.md §2.2).
    pub fn get<T: Any>(&self, token: ContextToken) -> anyhow::Result<Option<&T>> {
        match self.store.get(&token.0) {
            None => Ok(None),
            Some(boxed) => boxed
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| anyhow::anyhow!("context token holds a payload of a different type")),
        }
    }

    pub fn get_mut<T: Any>(&mut self, token: ContextToken) -> anyhow::Result<Option<&mut T>> {
        match self.store.get_mut(&token.0) {
            None => Ok(None),
            Some(boxed) => boxed
                .downcast_mut::<T>()
                .map(Some)
                .ok_or_else(|| anyhow::anyhow!("context token holds a payload of a different type")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_store_roundtrips_by_token_identity() {
        let mut cxt = ParseContext::new(Configuration::default());
        let counter_token = ContextToken::new();
        let notes_token = ContextToken::new();

        cxt.init(counter_token, 0usize);
        cxt.init(notes_token, Vec::<String>::new());

        *cxt.get_mut::<usize>(counter_token).unwrap().unwrap() += 1;
        assert_eq!(*cxt.get::<usize>(counter_token).unwrap().unwrap(), 1);
        assert!(cxt.get::<Vec<String>>(notes_token).unwrap().unwrap().is_empty());
    }

    #[test]
    fn wrong_payload_type_is_reported_not_panicked() {
        let mut cxt = ParseContext::new(Configuration::default());
        let token = ContextToken::new();
        cxt.init(token, 0usize);
        assert!(cxt.get::<String>(token).is_err());
    }
}
