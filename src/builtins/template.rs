// Plain-text flattening of a modifier's own content, used as the bound
// value for a template's content-slot parameter (SPEC_FULL.md §4.4's
// `$(slot)`).

use crate::ast::{BlockEntity, InlineEntity};

pub fn flatten_block_text(nodes: &[BlockEntity]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            BlockEntity::Paragraph(p) => out.push_str(&flatten_inline_text(&p.content)),
            BlockEntity::Preformatted(p) => out.push_str(&p.content.text),
            BlockEntity::Block(m) => match &m.expansion {
                Some(expansion) => out.push_str(&flatten_block_text(expansion)),
                None => out.push_str(&flatten_block_text(&m.content)),
            },
            BlockEntity::System(_) => {}
        }
    }
    out
}

pub fn flatten_inline_text(nodes: &[InlineEntity]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            InlineEntity::Text(t) => out.push_str(&t.content),
            InlineEntity::Escaped(e) => out.push(e.content),
            InlineEntity::Inline(m) => match &m.expansion {
                Some(expansion) => out.push_str(&flatten_inline_text(expansion)),
                None => out.push_str(&flatten_inline_text(&m.content)),
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LocationRange, ParagraphNode, SourceId, TextNode};

    #[test]
    fn flattens_a_plain_paragraph() {
        let loc = LocationRange::new(SourceId::new("t"), 0, 5);
        let blocks = vec![BlockEntity::Paragraph(ParagraphNode {
            location: loc.clone(),
            content: vec![InlineEntity::Text(TextNode { location: loc, content: "hello".into() })],
        })];
        assert_eq!(flatten_block_text(&blocks), "hello");
    }
}
