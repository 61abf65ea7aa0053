// Shorthands: textual patterns compiled into a modifier invocation at
// registration time (spec §3's `Shorthand`, §4.3 "Shorthand recognition").

use crate::config::registry::Named;
use crate::config::{BlockModifierDef, InlineModifierDef};
use std::rc::Rc;

/// `name arg0 parts[0] arg1 parts[1] ... [postfix contentSlot postfix]`.
/// `postfix == None` marks a marker shorthand with no content slot, the
/// way a marker modifier closes immediately with `;]` instead of `]`.
pub struct Shorthand<D> {
    pub name: String,
    pub parts: Vec<String>,
    pub postfix: Option<String>,
    pub definition: Rc<D>,
}

impl<D> Shorthand<D> {
    pub fn new(name: impl Into<String>, parts: Vec<String>, postfix: Option<String>, definition: Rc<D>) -> Self {
        Self { name: name.into(), parts, postfix, definition }
    }

    /// Number of arguments this shorthand captures before its content slot.
    pub fn argument_count(&self) -> usize {
        self.parts.len()
    }
}

impl<D> std::fmt::Debug for Shorthand<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shorthand")
            .field("name", &self.name)
            .field("parts", &self.parts)
            .field("postfix", &self.postfix)
            .finish()
    }
}

impl<D> Named for Shorthand<D> {
    fn name(&self) -> &str {
        &self.name
    }
}

pub type BlockShorthand = Shorthand<BlockModifierDef>;
pub type InlineShorthand = Shorthand<InlineModifierDef>;
