// `.define-block` / `.define-inline`: the user-definition mechanism proper
// (SPEC_FULL.md §4.4, component C7). Each captures its content verbatim (as
// raw source text, stashed by the parser into `node.state` — see
// `parser::parse_system_modifier`) and, on expansion, compiles it into a
// fresh modifier definition inserted into the live `Configuration`. Later
// invocations of that definition re-parse the captured text with their own
// argument bindings in scope (`builtins::params`), rather than splicing a
// pre-built tree — the only way an interpolator or `$name` reference
// resolves to a different value on each call with a shared `Rc`-held
// template.

use super::params;
use super::template;
use crate::ast::{BlockEntity, BlockModifierNode, InlineEntity, InlineModifierNode, SourceId, SystemModifierNode};
use crate::config::{
    BlockModifierBehavior, BlockModifierDef, ContextToken, InlineModifierBehavior, InlineModifierDef, ParseContext,
    SystemModifierBehavior, SystemModifierDef,
};
use crate::diag::{Message, MessageCode};
use std::any::Any;
use std::collections::HashMap;
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

/// `name arg0 arg1 ... argN-1 slot` — the last extra argument is the
/// content-slot name; everything before it is a plain parameter name.
fn split_params(rest: &[String]) -> (Vec<String>, Option<String>) {
    match rest.split_last() {
        None => (Vec::new(), None),
        Some((slot, init)) => (init.to_vec(), Some(slot.clone())),
    }
}

fn bindable_names(rest: &[String]) -> Vec<String> {
    rest.to_vec()
}

#[derive(Debug)]
struct DefineBlockBehavior {
    token: ContextToken,
    depth_token: ContextToken,
}

impl SystemModifierBehavior for DefineBlockBehavior {
    fn before_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let names = bindable_names(args.get(1..).unwrap_or_default());
        params::install_param_refs(cxt, self.token, &names);
        Vec::new()
    }

    fn after_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let names = bindable_names(args.get(1..).unwrap_or_default());
        params::remove_param_refs(cxt, &names);
        Vec::new()
    }

    fn prepare_expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let mut messages = Vec::new();
        if let Some(name) = args.first() {
            if cxt.configuration.block_modifiers.has(name) {
                messages.push(Message::error(
                    node.location.clone(),
                    MessageCode::NameAlreadyDefined,
                    format!("a block modifier named `{name}` is already registered"),
                ));
            }
        }
        messages
    }

    fn expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<BlockEntity>> {
        let args = args_of(node);
        let name = args.first().cloned()?;
        if cxt.configuration.block_modifiers.has(&name) {
            return Some(Vec::new());
        }
        let (params, slot_name) = split_params(args.get(1..).unwrap_or_default());
        let behavior = UserBlockBehavior {
            params,
            slot_name,
            template_text: raw_template_text(node),
            template_source: SourceId::new(format!("<{name} expansion>")),
            token: self.token,
            depth_token: self.depth_token,
        };
        let def = Rc::new(BlockModifierDef::new(name.clone(), Rc::new(behavior)).with_role_hint("user-defined"));
        cxt.configuration.block_modifiers.add(def);
        log::debug!("registered user-defined block modifier `{name}`");
        Some(Vec::new())
    }
}

pub fn install_define_block(cxt: &mut ParseContext, token: ContextToken, depth_token: ContextToken) -> Rc<SystemModifierDef> {
    let def = Rc::new(
        SystemModifierDef::new("define-block", Rc::new(DefineBlockBehavior { token, depth_token }))
            .with_delay_content_expansion(true)
            .with_always_try_expand(true),
    );
    cxt.configuration.system_modifiers.add(Rc::clone(&def));
    def
}

#[derive(Debug)]
pub(super) struct UserBlockBehavior {
    pub(super) params: Vec<String>,
    pub(super) slot_name: Option<String>,
    pub(super) template_text: String,
    pub(super) template_source: SourceId,
    pub(super) token: ContextToken,
    pub(super) depth_token: ContextToken,
}

impl BlockModifierBehavior for UserBlockBehavior {
    // Every invocation re-parses `template_text` through a brand-new
    // `Parser` (`parse_block_fragment`), whose own nodes start the engine's
    // `try_expand_block` depth counter back at 0 — a self-referential
    // template would never see `reparseDepthLimit` through that path alone.
    // This counter, carried on `ParseContext` rather than the Rust call
    // stack, is what actually bounds it.
    fn prepare_expand(&self, node: &mut BlockModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        if params::current_depth(cxt, self.depth_token) > cxt.configuration.reparse_depth_limit {
            return vec![Message::error(
                node.location.clone(),
                MessageCode::ReachedReparseLimit,
                format!("`{}` reached the reparse depth limit while expanding itself", node.definition.name),
            )];
        }
        Vec::new()
    }

    fn expand(&self, node: &mut BlockModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<BlockEntity>> {
        if params::current_depth(cxt, self.depth_token) > cxt.configuration.reparse_depth_limit {
            return None;
        }
        let mut bindings: HashMap<String, String> =
            self.params.iter().cloned().zip(node.arguments.iter().map(|a| a.value())).collect();
        let mut names = self.params.clone();
        if let Some(slot) = &self.slot_name {
            bindings.insert(slot.clone(), template::flatten_block_text(&node.content));
            names.push(slot.clone());
        }
        params::install_param_refs(cxt, self.token, &names);
        params::push_bindings(cxt, self.token, bindings);
        params::enter_expansion(cxt, self.depth_token);
        let (blocks, messages) = crate::parser::parse_block_fragment(self.template_source.clone(), &self.template_text, cxt);
        params::exit_expansion(cxt, self.depth_token);
        if !messages.is_empty() {
            log::debug!("{} message(s) while expanding block template `{}`", messages.len(), node.definition.name);
        }
        params::pop_bindings(cxt, self.token);
        params::remove_param_refs(cxt, &names);
        Some(blocks)
    }
}

#[derive(Debug)]
struct DefineInlineBehavior {
    token: ContextToken,
    depth_token: ContextToken,
}

impl SystemModifierBehavior for DefineInlineBehavior {
    fn before_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let names = bindable_names(args.get(1..).unwrap_or_default());
        params::install_param_refs(cxt, self.token, &names);
        Vec::new()
    }

    fn after_parse_content(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let names = bindable_names(args.get(1..).unwrap_or_default());
        params::remove_param_refs(cxt, &names);
        Vec::new()
    }

    fn prepare_expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let args = args_of(node);
        let mut messages = Vec::new();
        if let Some(name) = args.first() {
            if cxt.configuration.inline_modifiers.has(name) {
                messages.push(Message::error(
                    node.location.clone(),
                    MessageCode::NameAlreadyDefined,
                    format!("an inline modifier named `{name}` is already registered"),
                ));
            }
        }
        messages
    }

    fn expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<BlockEntity>> {
        let args = args_of(node);
        let name = args.first().cloned()?;
        if cxt.configuration.inline_modifiers.has(&name) {
            return Some(Vec::new());
        }
        let (params, slot_name) = split_params(args.get(1..).unwrap_or_default());
        let behavior = UserInlineBehavior {
            params,
            slot_name,
            template_text: raw_template_text(node),
            template_source: SourceId::new(format!("<{name} expansion>")),
            token: self.token,
            depth_token: self.depth_token,
        };
        let def = Rc::new(InlineModifierDef::new(name.clone(), Rc::new(behavior)).with_role_hint("user-defined"));
        cxt.configuration.inline_modifiers.add(def);
        log::debug!("registered user-defined inline modifier `{name}`");
        Some(Vec::new())
    }
}

pub fn install_define_inline(cxt: &mut ParseContext, token: ContextToken, depth_token: ContextToken) -> Rc<SystemModifierDef> {
    let def = Rc::new(
        SystemModifierDef::new("define-inline", Rc::new(DefineInlineBehavior { token, depth_token }))
            .with_delay_content_expansion(true)
            .with_always_try_expand(true),
    );
    cxt.configuration.system_modifiers.add(Rc::clone(&def));
    def
}

#[derive(Debug)]
pub(super) struct UserInlineBehavior {
    pub(super) params: Vec<String>,
    pub(super) slot_name: Option<String>,
    pub(super) template_text: String,
    pub(super) template_source: SourceId,
    pub(super) token: ContextToken,
    pub(super) depth_token: ContextToken,
}

impl InlineModifierBehavior for UserInlineBehavior {
    fn prepare_expand(&self, node: &mut InlineModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        if params::current_depth(cxt, self.depth_token) > cxt.configuration.reparse_depth_limit {
            return vec![Message::error(
                node.location.clone(),
                MessageCode::ReachedReparseLimit,
                format!("`{}` reached the reparse depth limit while expanding itself", node.definition.name),
            )];
        }
        Vec::new()
    }

    fn expand(&self, node: &mut InlineModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<InlineEntity>> {
        if params::current_depth(cxt, self.depth_token) > cxt.configuration.reparse_depth_limit {
            return None;
        }
        let mut bindings: HashMap<String, String> =
            self.params.iter().cloned().zip(node.arguments.iter().map(|a| a.value())).collect();
        let mut names = self.params.clone();
        if let Some(slot) = &self.slot_name {
            bindings.insert(slot.clone(), template::flatten_inline_text(&node.content));
            names.push(slot.clone());
        }
        params::install_param_refs(cxt, self.token, &names);
        params::push_bindings(cxt, self.token, bindings);
        params::enter_expansion(cxt, self.depth_token);
        let (inlines, messages) = crate::parser::parse_inline_fragment(self.template_source.clone(), &self.template_text, cxt);
        params::exit_expansion(cxt, self.depth_token);
        if !messages.is_empty() {
            log::debug!("{} message(s) while expanding inline template `{}`", messages.len(), node.definition.name);
        }
        params::pop_bindings(cxt, self.token);
        params::remove_param_refs(cxt, &names);
        Some(inlines)
    }
}
