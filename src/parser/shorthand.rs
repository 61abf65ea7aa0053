// Shorthand recognition (spec §4.3 "Shorthand recognition"): textual
// patterns compiled into modifier invocations at registration time, tried
// before falling back to a plain character during paragraph/block scanning.

use super::Parser;
use crate::ast::{BlockEntity, BlockModifierNode, InlineEntity, InlineModifierNode, ModifierArgument};
use crate::config::{BlockShorthand, InlineShorthand};
use std::rc::Rc;

impl<'a> Parser<'a> {
    /// Tries every registered inline shorthand (longest opening literal
    /// first) against the cursor. On a match, collects `parts.len()`
    /// argument segments, then the content slot (if the shorthand has a
    /// `postfix`), and returns a synthetic `InlineModifier` node bound to
    /// the shorthand's compiled definition.
    pub(super) fn try_inline_shorthand(&mut self) -> Option<InlineEntity> {
        let shorthand = self.cxt.configuration.inline_shorthands.longest_match(&self.scanner.remaining_text())?;
        let start = self.scanner.position();
        self.scanner.accept(&shorthand.name);

        let arguments = self.collect_shorthand_arguments(&shorthand.parts);
        let content = match &shorthand.postfix {
            None => Vec::new(),
            Some(postfix) => {
                let postfix = postfix.clone();
                let mut content = Vec::new();
                loop {
                    if self.scanner.is_eof() || self.scanner.peek("[;]") {
                        break;
                    }
                    if self.scanner.accept(&postfix) {
                        break;
                    }
                    self.parse_one_inline(&mut content);
                }
                content
            }
        };

        let head = self.scanner.range_from(start);
        let mut node = InlineModifierNode {
            location: head.clone(),
            head,
            definition: Rc::clone(&shorthand.definition),
            arguments,
            state: None,
            content,
            expansion: None,
        };
        self.try_expand_inline(&mut node, 0);
        Some(InlineEntity::Inline(node))
    }

    /// Block-position counterpart of [`Parser::try_inline_shorthand`], used
    /// wherever `parse_block` would otherwise fall back to a paragraph.
    pub(super) fn try_block_shorthand(&mut self) -> Option<BlockEntity> {
        let shorthand = self.cxt.configuration.block_shorthands.longest_match(&self.scanner.remaining_text())?;
        let start = self.scanner.position();
        self.scanner.accept(&shorthand.name);

        let arguments = self.collect_shorthand_arguments(&shorthand.parts);
        let content = match &shorthand.postfix {
            None => Vec::new(),
            Some(postfix) => {
                let mut out = Vec::new();
                self.parse_block_sequence(&mut out, Some(postfix));
                self.scanner.accept(postfix);
                out
            }
        };

        let head = self.scanner.range_from(start);
        let mut node = BlockModifierNode {
            location: head.clone(),
            head,
            definition: Rc::clone(&shorthand.definition),
            arguments,
            state: None,
            content,
            expansion: None,
        };
        self.try_expand_block(&mut node, 0);
        Some(BlockEntity::Block(node))
    }

    /// Reads `parts.len()` argument segments, each terminated by the
    /// matching literal in `parts` (spec: "collects k = parts.length
    /// argument segments by reading until each subsequent part literal
    /// appears").
    fn collect_shorthand_arguments(&mut self, parts: &[String]) -> Vec<ModifierArgument> {
        let mut args = Vec::new();
        for part in parts {
            let start = self.scanner.position();
            let stop_literal = part.clone();
            let entities = self.parse_arg_entities(move |p| p.scanner.is_eof() || p.scanner.peek(&stop_literal));
            self.scanner.accept(part);
            let location = self.scanner.range_from(start);
            args.push(ModifierArgument::new(location, entities));
        }
        args
    }
}
