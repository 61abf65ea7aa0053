// `-inline-shorthand` / `-block-shorthand`: compile a textual trigger
// pattern plus a captured template body into a `Shorthand` entry (spec
// glossary "Shorthand"), reusing the exact template-compilation machinery
// `.define-block`/`.define-inline` use (`define::UserBlockBehavior`,
// `define::UserInlineBehavior`) — a shorthand's synthesized definition is
// never registered under a typable name of its own, only reachable through
// the shorthand trigger.
//
// `name rest...` where `rest` is split as:
//   []                  -> marker shorthand, no content slot
//   [postfix]           -> one literal closer, no named slot
//   [..parts, slot, postfix] -> `parts` capture positional arguments,
//                               `slot` names the trailing content capture

use super::define::{UserBlockBehavior, UserInlineBehavior};
use super::params;
use crate::ast::{BlockEntity, SourceId, SystemModifierNode};
use crate::config::{
    BlockModifierDef, BlockShorthand, ContextToken, InlineModifierDef, InlineShorthand, ParseContext,
    SystemModifierBehavior, SystemModifierDef,
};
use crate::diag::Message;
use std::any::Any;
use std::rc::Rc;

fn args_of(node: &SystemModifierNode) -> Vec<String> {
    node.arguments.iter().map(|a| a.value()).collect()
}

fn raw_template_text(node: &SystemModifierNode) -> String {
    node.state
        .as_ref()
        .and_then(|s| s.borrow().downcast_ref::<String>().cloned())
        .unwrap_or_default()
}

struct Shape {
    parts: Vec<String>,
    postfix: Option<String>,
    slot_name: Option<String>,
}

fn split_shape(rest: &[String]) -> Shape {
    match rest.len() {
        0 => Shape { parts: Vec::new(), postfix: None, slot_name: None },
        1 => Shape { parts: Vec::new(), postfix: Some(rest[0].clone()), slot_name: None },
        n => Shape {
            parts: rest[..n - 2].to_vec(),
            postfix: Some(rest[n - 1].clone()),
            slot_name: Some(rest[n - 2].clone()),
        },
    }
}

/// Every positional name in a shape is bindable as `$name`/`$(name)` inside
/// the template body: the `parts` names (spec.md's `arg₀ part₀ arg₁ part₁ …`
/// notation) exactly as `.define-block`/`.define-inline` treat their own
/// non-slot arguments, plus the trailing content slot.
fn bindable_names(shape: &Shape) -> Vec<String> {
    let mut names = shape.parts.clone();
    if let Some(slot) = &shape.slot_name {
        names.push(slot.clone());
    }
    names
}

#[derive(Debug)]
struct InlineShorthandBehavior {
    token: ContextToken,
    depth_token: ContextToken,
}

impl SystemModifierBehavior for InlineShorthandBehavior {
    fn before_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let shape = split_shape(args.get(1..).unwrap_or_default());
        params::install_param_refs(cxt, self.token, &bindable_names(&shape));
        Vec::new()
    }

    fn after_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let shape = split_shape(args.get(1..).unwrap_or_default());
        params::remove_param_refs(cxt, &bindable_names(&shape));
        Vec::new()
    }

    fn expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<BlockEntity>> {
        let args = args_of(node);
        let name = args.first().cloned()?;
        let shape = split_shape(args.get(1..).unwrap_or_default());
        let behavior = UserInlineBehavior {
            params: shape.parts.clone(),
            slot_name: shape.slot_name,
            template_text: raw_template_text(node),
            template_source: SourceId::new(format!("<{name} shorthand expansion>")),
            token: self.token,
            depth_token: self.depth_token,
        };
        let def = Rc::new(InlineModifierDef::new(format!("\u{0}shorthand-inline-{name}"), Rc::new(behavior)));
        let shorthand = InlineShorthand::new(name.clone(), shape.parts, shape.postfix, def);
        cxt.configuration.inline_shorthands.add(Rc::new(shorthand));
        log::debug!("registered inline shorthand `{name}`");
        Some(Vec::new())
    }
}

pub fn install_inline_shorthand(cxt: &mut ParseContext, token: ContextToken, depth_token: ContextToken) -> Rc<SystemModifierDef> {
    let def = Rc::new(
        SystemModifierDef::new("inline-shorthand", Rc::new(InlineShorthandBehavior { token, depth_token }))
            .with_delay_content_expansion(true)
            .with_always_try_expand(true),
    );
    cxt.configuration.system_modifiers.add(Rc::clone(&def));
    def
}

#[derive(Debug)]
struct BlockShorthandBehavior {
    token: ContextToken,
    depth_token: ContextToken,
}

impl SystemModifierBehavior for BlockShorthandBehavior {
    fn before_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let shape = split_shape(args.get(1..).unwrap_or_default());
        params::install_param_refs(cxt, self.token, &bindable_names(&shape));
        Vec::new()
    }

    fn after_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let shape = split_shape(args.get(1..).unwrap_or_default());
        params::remove_param_refs(cxt, &bindable_names(&shape));
        Vec::new()
    }

    fn expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<BlockEntity>> {
        let args = args_of(node);
        let name = args.first().cloned()?;
        let shape = split_shape(args.get(1..).unwrap_or_default());
        let behavior = UserBlockBehavior {
            params: shape.parts.clone(),
            slot_name: shape.slot_name,
            template_text: raw_template_text(node),
            template_source: SourceId::new(format!("<{name} shorthand expansion>")),
            token: self.token,
            depth_token: self.depth_token,
        };
        let def = Rc::new(BlockModifierDef::new(format!("\u{0}shorthand-block-{name}"), Rc::new(behavior)));
        let shorthand = BlockShorthand::new(name.clone(), shape.parts, shape.postfix, def);
        cxt.configuration.block_shorthands.add(Rc::new(shorthand));
        log::debug!("registered block shorthand `{name}`");
        Some(Vec::new())
    }
}

pub fn install_block_shorthand(cxt: &mut ParseContext, token: ContextToken, depth_token: ContextToken) -> Rc<SystemModifierDef> {
    let def = Rc::new(
        SystemModifierDef::new("block-shorthand", Rc::new(BlockShorthandBehavior { token, depth_token }))
            .with_delay_content_expansion(true)
            .with_always_try_expand(true),
    );
    cxt.configuration.system_modifiers.add(Rc::clone(&def));
    def
}
