// Modifier invocation nodes: the part of the AST that definitions
// registered in a `Configuration` can own state in and rewrite via
// expansion (spec §3).

use super::location::LocationRange;
use crate::config::{BlockModifierDef, InlineModifierDef, SystemModifierDef};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Per-node state a modifier definition's callbacks allocate and own. The
/// parser never inspects it, only threads it through — hence type erasure.
/// `Rc<RefCell<_>>` (rather than `Box<_>`) keeps `ModifierNode` cheaply
/// `Clone`, which expansion needs when it duplicates generated content.
pub type ModifierState = Rc<RefCell<dyn Any>>;

/// A bracketed modifier invocation, generic over its content's entity kind
/// `C` (`BlockEntity` or `InlineEntity`) and the concrete definition type
/// `D` that was matched (`BlockModifierDef`, `InlineModifierDef` or
/// `SystemModifierDef`) — these differ even when `C` coincides (a system
/// modifier's content is `BlockEntity`, same as a block modifier's), which
/// is exactly what keeps the three registries' identities distinct.
pub struct ModifierNode<C, D> {
    pub location: LocationRange,
    /// The `[...]` introducer range, from the opening bracket to the
    /// closing `]`/`;]` of the head (spec §3: "head is the […] introducer range").
    pub head: LocationRange,
    pub definition: Rc<D>,
    pub arguments: Vec<ModifierArgument>,
    pub state: Option<ModifierState>,
    pub content: Vec<C>,
    /// `None` until expansion runs; `Some(_)` (possibly empty) once it has.
    /// A `None` after `expand()` actually ran means "keep `content`" per
    /// spec's invariant and the resolved open question in DESIGN.md.
    pub expansion: Option<Vec<C>>,
}

impl<C: Clone, D> Clone for ModifierNode<C, D> {
    fn clone(&self) -> Self {
        Self {
            location: self.location.clone(),
            head: self.head.clone(),
            definition: Rc::clone(&self.definition),
            arguments: self.arguments.clone(),
            state: self.state.clone(),
            content: self.content.clone(),
            expansion: self.expansion.clone(),
        }
    }
}

impl<C: std::fmt::Debug, D> std::fmt::Debug for ModifierNode<C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifierNode")
            .field("location", &self.location)
            .field("arguments", &self.arguments)
            .field("content", &self.content)
            .field("expansion", &self.expansion)
            .field("has_state", &self.state.is_some())
            .finish()
    }
}

pub type BlockModifierNode = ModifierNode<super::BlockEntity, BlockModifierDef>;
pub type InlineModifierNode = ModifierNode<super::InlineEntity, InlineModifierDef>;
pub type SystemModifierNode = ModifierNode<super::BlockEntity, SystemModifierDef>;

/// One `:`-separated argument in a modifier head: an ordered sequence of
/// text/escape/interpolation entities, plus a cache of the fully expanded
/// textual value (filled in once interpolators have run).
#[derive(Debug, Clone)]
pub struct ModifierArgument {
    pub location: LocationRange,
    pub parts: Vec<super::ArgumentEntity>,
    pub expansion: Option<String>,
}

impl ModifierArgument {
    pub fn new(location: LocationRange, parts: Vec<super::ArgumentEntity>) -> Self {
        Self { location, parts, expansion: None }
    }

    /// Literal text of the argument ignoring interpolators (used before
    /// expansion has run, or for interpolators with no `expand` hook).
    pub fn raw_text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                super::ArgumentEntity::Text(t) => out.push_str(&t.content),
                super::ArgumentEntity::Escaped(e) => out.push(e.content),
                super::ArgumentEntity::Interpolation(i) => {
                    out.push_str(i.expansion.as_deref().unwrap_or(""));
                }
            }
        }
        out
    }

    /// The value to use in expansion: the cached fully-expanded text if
    /// present, otherwise the raw text.
    pub fn value(&self) -> String {
        self.expansion.clone().unwrap_or_else(|| self.raw_text())
    }
}
