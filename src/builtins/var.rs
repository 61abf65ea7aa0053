// `-var name value`: registers a fixed-value argument interpolator `$name`
// usable from then on in any argument position (SPEC_FULL.md §4.4's
// "illustrative exemplar" list). Simpler than `.define-*`: there is no
// template to re-parse, so the bound value is baked into the interpolator's
// closure once at registration time rather than threaded through
// `builtins::params`'s binding stack.

use crate::ast::SystemModifierNode;
use crate::config::{ArgumentInterpolator, ParseContext, SlotType, SystemModifierBehavior, SystemModifierDef};
use crate::diag::{Message, MessageCode};
use std::rc::Rc;

#[derive(Debug)]
struct VarBehavior;

impl SystemModifierBehavior for VarBehavior {
    fn prepare_expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext) -> Vec<Message> {
        let mut messages = Vec::new();
        if let Some(name_arg) = node.arguments.first() {
            let opener = format!("${}", name_arg.value());
            if cxt.configuration.argument_interpolators.has(&opener) {
                messages.push(Message::error(
                    node.location.clone(),
                    MessageCode::NameAlreadyDefined,
                    format!("a variable named `{}` is already registered", name_arg.value()),
                ));
            }
        }
        messages
    }

    fn expand(&self, node: &mut SystemModifierNode, cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<crate::ast::BlockEntity>> {
        let name = node.arguments.first()?.value();
        let value = node.arguments.get(1).map(|a| a.value()).unwrap_or_default();
        let opener = format!("${name}");
        if cxt.configuration.argument_interpolators.has(&opener) {
            return Some(Vec::new());
        }
        let interp = ArgumentInterpolator::new(opener.clone(), "").with_expand(move |_raw, _cxt, _immediate| Some(value.clone()));
        cxt.configuration.argument_interpolators.add(Rc::new(interp));
        log::debug!("registered variable `{opener}`");
        Some(Vec::new())
    }
}

pub fn install_var(cxt: &mut ParseContext) -> Rc<SystemModifierDef> {
    let def = Rc::new(SystemModifierDef::new("var", Rc::new(VarBehavior)).with_slot_type(SlotType::Marker));
    cxt.configuration.system_modifiers.add(Rc::clone(&def));
    def
}
