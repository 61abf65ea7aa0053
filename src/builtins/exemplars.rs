// Illustrative built-in modifiers (SPEC_FULL.md §4.4's exemplar list):
// `print`, `quote`, `note`, `em`, `strong`. Everything but `print` reuses
// `NoopBehavior` — their content is left untouched at parse time and given
// meaning only by a renderer (`render::html_demo`), exactly the way the
// framework's dispatch order intends a modifier with no `expand` result to
// be handled by a registered renderer rather than a synthesized expansion.

use crate::ast::{InlineEntity, InlineModifierNode, TextNode};
use crate::config::{BlockModifierDef, InlineModifierBehavior, InlineModifierDef, NoopBehavior, ParseContext, SlotType};
use std::rc::Rc;

pub fn install_quote(cxt: &mut ParseContext) -> Rc<BlockModifierDef> {
    let def = Rc::new(BlockModifierDef::new("quote", Rc::new(NoopBehavior)).with_role_hint("exemplar"));
    cxt.configuration.block_modifiers.add(Rc::clone(&def));
    def
}

pub fn install_note(cxt: &mut ParseContext) -> Rc<BlockModifierDef> {
    let def = Rc::new(BlockModifierDef::new("note", Rc::new(NoopBehavior)).with_role_hint("exemplar"));
    cxt.configuration.block_modifiers.add(Rc::clone(&def));
    def
}

pub fn install_em(cxt: &mut ParseContext) -> Rc<InlineModifierDef> {
    let def = Rc::new(InlineModifierDef::new("em", Rc::new(NoopBehavior)).with_role_hint("exemplar"));
    cxt.configuration.inline_modifiers.add(Rc::clone(&def));
    def
}

pub fn install_strong(cxt: &mut ParseContext) -> Rc<InlineModifierDef> {
    let def = Rc::new(InlineModifierDef::new("strong", Rc::new(NoopBehavior)).with_role_hint("exemplar"));
    cxt.configuration.inline_modifiers.add(Rc::clone(&def));
    def
}

/// A marker inline modifier whose one argument is printed verbatim as text
/// — the simplest possible use of the expansion hook, and the vehicle used
/// to demonstrate `$(name)` interpolation in practice (SPEC_FULL.md §8).
#[derive(Debug)]
struct PrintBehavior;

impl InlineModifierBehavior for PrintBehavior {
    fn expand(&self, node: &mut InlineModifierNode, _cxt: &mut ParseContext, _immediate: bool) -> Option<Vec<InlineEntity>> {
        let text = node.arguments.first().map(|a| a.value()).unwrap_or_default();
        Some(vec![InlineEntity::Text(TextNode { location: node.location.clone(), content: text })])
    }
}

pub fn install_print(cxt: &mut ParseContext) -> Rc<InlineModifierDef> {
    let def = Rc::new(InlineModifierDef::new("print", Rc::new(PrintBehavior)).with_slot_type(SlotType::Marker));
    cxt.configuration.inline_modifiers.add(Rc::clone(&def));
    def
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceId;
    use crate::config::Configuration;
    use crate::parser::parse;

    #[test]
    fn print_emits_its_argument_as_text() {
        let mut cxt = ParseContext::new(Configuration::default());
        install_print(&mut cxt);
        let doc = parse(SourceId::new("t.emmm"), "[/print hello]", &mut cxt);
        let stripped = doc.to_stripped();
        match &stripped.root[0] {
            crate::ast::BlockEntity::Paragraph(p) => match &p.content[0] {
                InlineEntity::Text(t) => assert_eq!(t.content, "hello"),
                other => panic!("expected Text, got {other:?}"),
            },
            other => panic!("expected Paragraph, got {other:?}"),
        }
    }
}
