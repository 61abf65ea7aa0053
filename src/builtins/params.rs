// The parameter-binding mechanism shared by `.define-block`, `.define-inline`,
// `-block-shorthand` and `-inline-shorthand` (SPEC_FULL.md §4.4's "delayed
// stack" note).
//
// A user-defined modifier's template body references its arguments and
// content slot as `$name` (a bare inline-modifier-shaped reference) or
// `$(name)` (an argument interpolator). Both forms are registered only for
// the span during which a template body is being captured or re-parsed, so
// a reference like `[/$x]` resolves cleanly without `$x` becoming a real,
// permanently typable name anywhere else in a document.
//
// Binding values themselves live on a small stack keyed by one shared
// `ContextToken`, pushed right before a compiled template is re-parsed with
// a specific invocation's arguments and popped right after — see
// `define::UserBlockBehavior`/`UserInlineBehavior`.

use crate::ast::{InlineEntity, InlineModifierNode, TextNode};
use crate::config::{ArgumentInterpolator, ContextToken, InlineModifierBehavior, InlineModifierDef, ParseContext, SlotType};
use std::collections::HashMap;
use std::rc::Rc;

pub type BindingStack = Vec<HashMap<String, String>>;

pub fn lookup_binding(cxt: &ParseContext, token: ContextToken, name: &str) -> String {
    cxt.get::<BindingStack>(token)
        .ok()
        .flatten()
        .and_then(|stack| stack.last())
        .and_then(|bindings| bindings.get(name))
        .cloned()
        .unwrap_or_default()
}

pub fn push_bindings(cxt: &mut ParseContext, token: ContextToken, bindings: HashMap<String, String>) {
    if let Ok(Some(stack)) = cxt.get_mut::<BindingStack>(token) {
        stack.push(bindings);
    }
}

pub fn pop_bindings(cxt: &mut ParseContext, token: ContextToken) {
    if let Ok(Some(stack)) = cxt.get_mut::<BindingStack>(token) {
        stack.pop();
    }
}

/// How many nested template re-parses (`.define-block`/`.define-inline`/
/// `-*-shorthand` invocations) currently enclose the one about to run.
/// Every such re-parse starts its own `Parser` at depth 0, so the engine's
/// own `reparseDepthLimit` threading (`try_expand_*`'s `depth` parameter)
/// never sees a self-referential template — this counter is the mechanism
/// that bounds it instead (SPEC_FULL.md §8 "Termination").
pub fn current_depth(cxt: &ParseContext, token: ContextToken) -> u32 {
    cxt.get::<u32>(token).ok().flatten().copied().unwrap_or(0)
}

pub fn enter_expansion(cxt: &mut ParseContext, token: ContextToken) {
    if let Ok(Some(depth)) = cxt.get_mut::<u32>(token) {
        *depth += 1;
    }
}

pub fn exit_expansion(cxt: &mut ParseContext, token: ContextToken) {
    if let Ok(Some(depth)) = cxt.get_mut::<u32>(token) {
        *depth -= 1;
    }
}

/// A placeholder inline modifier for `$name`: while registered, expanding it
/// reads whatever is currently bound to `name` on the binding stack.
#[derive(Debug)]
struct ParamRefBehavior {
    name: String,
    token: ContextToken,
}

impl InlineModifierBehavior for ParamRefBehavior {
    fn expand(&self, node: &mut InlineModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<InlineEntity>> {
        let value = lookup_binding(cxt, self.token, &self.name);
        Some(vec![InlineEntity::Text(TextNode { location: node.location.clone(), content: value })])
    }
}

/// Registers `$name` (inline modifier) and `$(name` (argument interpolator,
/// closed by `)`) for every name in `names`. Call in a `before_parse_content`
/// hook, paired with [`remove_param_refs`] in the matching `after_parse_content`.
pub fn install_param_refs(cxt: &mut ParseContext, token: ContextToken, names: &[String]) {
    for name in names {
        let inline_name = format!("${name}");
        let def = InlineModifierDef::new(inline_name, Rc::new(ParamRefBehavior { name: name.clone(), token }))
            .with_slot_type(SlotType::Marker);
        cxt.configuration.inline_modifiers.add(Rc::new(def));

        let opener = format!("$({name}");
        let bound_name = name.clone();
        cxt.configuration.argument_interpolators.add(Rc::new(
            ArgumentInterpolator::new(opener, ")")
                .with_expand(move |_raw, cxt, _immediate| Some(lookup_binding(cxt, token, &bound_name))),
        ));
    }
}

pub fn remove_param_refs(cxt: &mut ParseContext, names: &[String]) {
    for name in names {
        cxt.configuration.inline_modifiers.remove(&format!("${name}"));
        cxt.configuration.argument_interpolators.remove(&format!("$({name}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    #[test]
    fn binding_stack_reads_most_recent_push() {
        let mut cxt = ParseContext::new(Configuration::default());
        let token = ContextToken::new();
        cxt.init(token, BindingStack::new());

        let mut outer = HashMap::new();
        outer.insert("x".to_string(), "outer".to_string());
        push_bindings(&mut cxt, token, outer);
        assert_eq!(lookup_binding(&cxt, token, "x"), "outer");

        let mut inner = HashMap::new();
        inner.insert("x".to_string(), "inner".to_string());
        push_bindings(&mut cxt, token, inner);
        assert_eq!(lookup_binding(&cxt, token, "x"), "inner");

        pop_bindings(&mut cxt, token);
        assert_eq!(lookup_binding(&cxt, token, "x"), "outer");
    }

    #[test]
    fn install_and_remove_param_refs_round_trip() {
        let mut cxt = ParseContext::new(Configuration::default());
        let token = ContextToken::new();
        cxt.init(token, BindingStack::new());

        let names = vec!["x".to_string()];
        install_param_refs(&mut cxt, token, &names);
        assert!(cxt.configuration.inline_modifiers.has("$x"));
        assert!(cxt.configuration.argument_interpolators.has("$(x"));

        remove_param_refs(&mut cxt, &names);
        assert!(!cxt.configuration.inline_modifiers.has("$x"));
        assert!(!cxt.configuration.argument_interpolators.has("$(x"));
    }
}
