// Built-in modifiers (SPEC_FULL.md §4.4, component C7): the user-definition
// mechanism (`.define-block`, `.define-inline`, `-inline-shorthand`,
// `-block-shorthand`, `-var`) plus a handful of illustrative exemplar
// modifiers (`print`, `quote`, `note`, `em`, `strong`). None of this is
// reachable through `Configuration::default()` alone — a caller opts in by
// calling [`install`], mirroring how the teacher keeps its CommonMark
// extension table a separate, explicitly-installed layer over the bare
// block/inline grammar.

mod define;
mod exemplars;
mod params;
mod shorthand_builtins;
mod template;
mod var;

use crate::config::{BlockModifierDef, ContextToken, InlineModifierDef, ParseContext, SystemModifierDef};
use std::rc::Rc;

/// Handles to every definition `install` registered, so a host can look one
/// up by identity (e.g. to register a renderer against `builtins.quote`
/// without a name-based lookup — see `render::html_demo`).
pub struct Builtins {
    pub print: Rc<InlineModifierDef>,
    pub em: Rc<InlineModifierDef>,
    pub strong: Rc<InlineModifierDef>,
    pub quote: Rc<BlockModifierDef>,
    pub note: Rc<BlockModifierDef>,
    pub define_block: Rc<SystemModifierDef>,
    pub define_inline: Rc<SystemModifierDef>,
    pub inline_shorthand: Rc<SystemModifierDef>,
    pub block_shorthand: Rc<SystemModifierDef>,
    pub var: Rc<SystemModifierDef>,
}

/// Registers every built-in modifier into `cxt`'s live configuration.
pub fn install(cxt: &mut ParseContext) -> Builtins {
    log::info!("installing builtin modifiers");
    let bindings_token = ContextToken::new();
    cxt.init(bindings_token, params::BindingStack::new());
    // Counts nested template re-parses so a self-referential user-defined
    // modifier is still bounded by `reparse_depth_limit` even though each
    // invocation's fragment re-parse runs in a fresh `Parser` (see
    // `define::UserBlockBehavior::expand`).
    let depth_token = ContextToken::new();
    cxt.init(depth_token, 0u32);

    let print = exemplars::install_print(cxt);
    let em = exemplars::install_em(cxt);
    let strong = exemplars::install_strong(cxt);
    let quote = exemplars::install_quote(cxt);
    let note = exemplars::install_note(cxt);
    let define_block = define::install_define_block(cxt, bindings_token, depth_token);
    let define_inline = define::install_define_inline(cxt, bindings_token, depth_token);
    let inline_shorthand = shorthand_builtins::install_inline_shorthand(cxt, bindings_token, depth_token);
    let block_shorthand = shorthand_builtins::install_block_shorthand(cxt, bindings_token, depth_token);
    let var = var::install_var(cxt);

    Builtins { print, em, strong, quote, note, define_block, define_inline, inline_shorthand, block_shorthand, var }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockEntity, InlineEntity, SourceId};
    use crate::config::Configuration;
    use crate::parser::parse;

    fn parse_with_builtins(s: &str) -> crate::ast::Document {
        let mut cxt = ParseContext::new(Configuration::default());
        install(&mut cxt);
        parse(SourceId::new("t.emmm"), s, &mut cxt)
    }

    #[test]
    fn define_block_registers_a_reusable_block_modifier() {
        let doc = parse_with_builtins(
            "[-define-block greeting:who]\n[.quote]\nhello [/$who]\n\n[.greeting]\nworld\n",
        );
        assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
        let stripped = doc.to_stripped();
        let has_greeting = stripped.root.iter().any(|b| match b {
            BlockEntity::Paragraph(p) => {
                super::template::flatten_inline_text(&p.content).contains("hello world")
            }
            _ => false,
        });
        assert!(has_greeting, "expected the expanded greeting, got {:?}", stripped.root);
    }

    #[test]
    fn inline_shorthand_wraps_captured_content() {
        // `p...p` shorthand whose body prints its own captured slot back out.
        let doc = parse_with_builtins("[-inline-shorthand p:x:p][/print $(x)]\n\np1p");
        assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
        let stripped = doc.to_stripped();
        let found = stripped.root.iter().any(|b| match b {
            BlockEntity::Paragraph(p) => match p.content.last() {
                Some(InlineEntity::Text(t)) => t.content.contains('1'),
                _ => false,
            },
            _ => false,
        });
        assert!(found, "expected shorthand expansion to surface \"1\", got {:?}", stripped.root);
    }

    #[test]
    fn var_defines_a_reusable_interpolator() {
        // `-var` registers only the bare-identifier form `$name`, not the
        // bracketed `$(name)` an argument interpolator's postfix form uses.
        let doc = parse_with_builtins("[-var color red;]\n\n[/print $color]");
        assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
        let stripped = doc.to_stripped();
        let text = stripped
            .root
            .iter()
            .filter_map(|b| match b {
                BlockEntity::Paragraph(p) => Some(super::template::flatten_inline_text(&p.content)),
                _ => None,
            })
            .collect::<String>();
        assert_eq!(text, "red", "expected $color to expand to its registered value, got {:?}", stripped.root);
    }
}
