// Configuration & context (spec §3/§4.4, component C4): the live,
// mutable registries a parse consults and a user `.define-*` modifier can
// extend mid-parse, plus the per-parse context that owns them.

mod context;
mod definition;
mod interpolator;
pub mod registry;
mod shorthand;

pub use context::{ContextToken, ParseContext};
pub use definition::{
    BlockModifierBehavior, BlockModifierDef, InlineModifierBehavior, InlineModifierDef, NoopBehavior,
    SlotType, SystemModifierBehavior, SystemModifierDef,
};
pub use interpolator::ArgumentInterpolator;
pub use registry::ModifierRegistry as Registry;
pub use shorthand::{BlockShorthand, InlineShorthand, Shorthand};

use std::cell::RefCell;
use std::rc::Rc;

const DEFAULT_REPARSE_DEPTH_LIMIT: u32 = 10;

/// Four ordered registries plus the shorthand sets (spec §3). Mutating any
/// of them notifies the same shared callback, so a `Parser` holding one
/// `on_change` closure learns about changes to any registry without
/// wiring up five separate subscriptions.
pub struct Configuration {
    pub block_modifiers: Registry<BlockModifierDef>,
    pub inline_modifiers: Registry<InlineModifierDef>,
    pub system_modifiers: Registry<SystemModifierDef>,
    pub argument_interpolators: Registry<ArgumentInterpolator>,
    pub block_shorthands: Registry<BlockShorthand>,
    pub inline_shorthands: Registry<InlineShorthand>,
    pub reparse_depth_limit: u32,
    on_change: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
}

impl Configuration {
    pub fn new() -> Self {
        let on_change: Rc<RefCell<Option<Box<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        Self {
            block_modifiers: Registry::new(Rc::clone(&on_change)),
            inline_modifiers: Registry::new(Rc::clone(&on_change)),
            system_modifiers: Registry::new(Rc::clone(&on_change)),
            argument_interpolators: Registry::new(Rc::clone(&on_change)),
            block_shorthands: Registry::new(Rc::clone(&on_change)),
            inline_shorthands: Registry::new(Rc::clone(&on_change)),
            reparse_depth_limit: DEFAULT_REPARSE_DEPTH_LIMIT,
            on_change,
        }
    }

    /// Installed by the owning `Parser` so the four lookup caches rebuild
    /// as soon as a `.define-*` modifier mutates the live configuration
    /// mid-parse (spec §9 design note: "Implement as an observer callback,
    /// not a back-pointer").
    pub fn set_on_change(&mut self, callback: impl FnMut() + 'static) {
        *self.on_change.borrow_mut() = Some(Box::new(callback));
    }

    /// Shallow copy of the four registries and the shorthand sets (spec
    /// §5: "Callers that want to parse multiple documents independently
    /// must clone the configuration first"). The clone gets its own,
    /// unset `on_change` — mutating one configuration's registries never
    /// fires the other's callback (spec §8 "idempotent configuration
    /// cloning").
    pub fn from(other: &Configuration) -> Self {
        Self {
            block_modifiers: other.block_modifiers.clone(),
            inline_modifiers: other.inline_modifiers.clone(),
            system_modifiers: other.system_modifiers.clone(),
            argument_interpolators: other.argument_interpolators.clone(),
            block_shorthands: other.block_shorthands.clone(),
            inline_shorthands: other.inline_shorthands.clone(),
            reparse_depth_limit: other.reparse_depth_limit,
            on_change: Rc::new(RefCell::new(None)),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc as StdRc;

    #[test]
    fn cloned_configuration_is_independent() {
        let mut original = Configuration::new();
        original.block_modifiers.add(StdRc::new(BlockModifierDef::unknown()));

        let mut clone = Configuration::from(&original);
        assert!(clone.block_modifiers.has("\u{0}unknown-block"));

        clone.block_modifiers.remove("\u{0}unknown-block");
        assert!(!clone.block_modifiers.has("\u{0}unknown-block"));
        assert!(original.block_modifiers.has("\u{0}unknown-block"));
    }

    #[test]
    fn on_change_fires_for_any_registry() {
        let mut config = Configuration::new();
        let fired = StdRc::new(std::cell::Cell::new(0u32));
        let fired2 = StdRc::clone(&fired);
        config.set_on_change(move || fired2.set(fired2.get() + 1));

        config.block_modifiers.add(StdRc::new(BlockModifierDef::unknown()));
        config.inline_modifiers.add(StdRc::new(InlineModifierDef::unknown()));
        assert_eq!(fired.get(), 2);
    }
}
