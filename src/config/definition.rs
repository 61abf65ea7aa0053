// Modifier definitions and their lifecycle hooks (spec §3's
// `ModifierDefinition`, §4.4's shared two-phase lifecycle).
//
// Block, inline and system definitions share the same shape but are kept
// as three concrete structs rather than one generic one: their content
// entity kinds only partially coincide (system content is `BlockEntity`,
// same as block, but the two are never interchangeable — they live in
// separate registries with separate identities) and Rust trait objects
// read more plainly here than a shared generic would, matching the
// teacher's own preference for concrete enums/structs over deep generics.

use crate::ast::{BlockEntity, BlockModifierNode, InlineEntity, InlineModifierNode, SystemModifierNode};
use crate::config::{ParseContext, Registry};
use crate::diag::Message;
use std::rc::Rc;

pub use crate::config::registry::Named;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    Normal,
    Preformatted,
    /// No content slot at all — a marker modifier, closed immediately with
    /// `;]` (spec glossary: "Slot: Normal, Preformatted, or None/marker").
    Marker,
}

macro_rules! modifier_behavior_trait {
    ($trait_name:ident, $node:ty, $entity:ty) => {
        pub trait $trait_name: std::fmt::Debug {
            fn before_parse_content(&self, _node: &mut $node, _cxt: &mut ParseContext) -> Vec<Message> {
                Vec::new()
            }
            fn after_parse_content(&self, _node: &mut $node, _cxt: &mut ParseContext) -> Vec<Message> {
                Vec::new()
            }
            fn prepare_expand(&self, _node: &mut $node, _cxt: &mut ParseContext) -> Vec<Message> {
                Vec::new()
            }
            fn expand(
                &self,
                _node: &mut $node,
                _cxt: &mut ParseContext,
                _immediate: bool,
            ) -> Option<Vec<$entity>> {
                None
            }
            fn before_process_expansion(&self, _node: &mut $node, _cxt: &mut ParseContext) -> Vec<Message> {
                Vec::new()
            }
            fn after_process_expansion(&self, _node: &mut $node, _cxt: &mut ParseContext) -> Vec<Message> {
                Vec::new()
            }
        }
    };
}

modifier_behavior_trait!(BlockModifierBehavior, BlockModifierNode, BlockEntity);
modifier_behavior_trait!(InlineModifierBehavior, InlineModifierNode, InlineEntity);
modifier_behavior_trait!(SystemModifierBehavior, SystemModifierNode, BlockEntity);

/// A behavior implementing every hook's default (no-op, never expands).
/// Used for the reserved `UNKNOWN` definition substituted when no
/// registered name matches at a modifier open position (spec §4.3).
#[derive(Debug, Clone, Copy)]
pub struct NoopBehavior;
impl BlockModifierBehavior for NoopBehavior {}
impl InlineModifierBehavior for NoopBehavior {}
impl SystemModifierBehavior for NoopBehavior {}

macro_rules! modifier_def {
    ($def_name:ident, $behavior_trait:ident, $unknown_name:literal) => {
        pub struct $def_name {
            pub name: String,
            pub slot_type: SlotType,
            pub role_hint: Option<String>,
            pub delay_content_expansion: bool,
            pub always_try_expand: bool,
            pub behavior: Rc<dyn $behavior_trait>,
        }

        impl $def_name {
            pub fn new(name: impl Into<String>, behavior: Rc<dyn $behavior_trait>) -> Self {
                Self {
                    name: name.into(),
                    slot_type: SlotType::Normal,
                    role_hint: None,
                    delay_content_expansion: false,
                    always_try_expand: false,
                    behavior,
                }
            }

            pub fn with_slot_type(mut self, slot_type: SlotType) -> Self {
                self.slot_type = slot_type;
                self
            }

            pub fn with_role_hint(mut self, role_hint: impl Into<String>) -> Self {
                self.role_hint = Some(role_hint.into());
                self
            }

            pub fn with_delay_content_expansion(mut self, delay: bool) -> Self {
                self.delay_content_expansion = delay;
                self
            }

            pub fn with_always_try_expand(mut self, always: bool) -> Self {
                self.always_try_expand = always;
                self
            }

            /// Reserved placeholder substituted when a modifier open
            /// position matches no registered name (spec §4.3). Its name
            /// can never be typed in source, so it can't collide with a
            /// real registration.
            pub fn unknown() -> Self {
                Self::new($unknown_name, Rc::new(NoopBehavior))
            }
        }

        impl std::fmt::Debug for $def_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($def_name))
                    .field("name", &self.name)
                    .field("slot_type", &self.slot_type)
                    .field("delay_content_expansion", &self.delay_content_expansion)
                    .field("always_try_expand", &self.always_try_expand)
                    .finish()
            }
        }

        impl Named for $def_name {
            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

modifier_def!(BlockModifierDef, BlockModifierBehavior, "\u{0}unknown-block");
modifier_def!(InlineModifierDef, InlineModifierBehavior, "\u{0}unknown-inline");
modifier_def!(SystemModifierDef, SystemModifierBehavior, "\u{0}unknown-system");

pub type BlockModifierRegistry = Registry<BlockModifierDef>;
pub type InlineModifierRegistry = Registry<InlineModifierDef>;
pub type SystemModifierRegistry = Registry<SystemModifierDef>;
