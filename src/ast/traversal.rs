// Generic read-only walks over the AST, used by the stripping pass, the
// renderer's fallback logic, and the no-lost-characters test.

use super::entities::{ArgumentEntity, BlockEntity, InlineEntity};

/// Depth-first visit of every leaf (`Text`/`Escaped`/`Preformatted`) and
/// every explicit token range in source order, invoking `visit` with each
/// leaf's location. Used to check spec §8's no-lost-characters invariant:
/// concatenating these ranges reconstructs the original source exactly.
pub fn walk_blocks<'a>(blocks: &'a [BlockEntity], visit: &mut impl FnMut(&'a super::LocationRange)) {
    for block in blocks {
        match block {
            BlockEntity::Paragraph(p) => walk_inlines(&p.content, visit),
            BlockEntity::Preformatted(p) => visit(&p.location),
            BlockEntity::Block(m) => {
                visit(&m.head);
                match &m.expansion {
                    Some(expansion) => walk_blocks(expansion, visit),
                    None => walk_blocks(&m.content, visit),
                }
            }
            BlockEntity::System(m) => {
                visit(&m.head);
                walk_blocks(&m.content, visit);
            }
        }
    }
}

pub fn walk_inlines<'a>(inlines: &'a [InlineEntity], visit: &mut impl FnMut(&'a super::LocationRange)) {
    for inline in inlines {
        match inline {
            InlineEntity::Text(t) => visit(&t.location),
            InlineEntity::Escaped(e) => visit(&e.location),
            InlineEntity::Inline(m) => {
                visit(&m.head);
                match &m.expansion {
                    Some(expansion) => walk_inlines(expansion, visit),
                    None => walk_inlines(&m.content, visit),
                }
            }
        }
    }
}

pub fn walk_argument_entities<'a>(
    parts: &'a [ArgumentEntity],
    visit: &mut impl FnMut(&'a super::LocationRange),
) {
    for part in parts {
        visit(part.location());
    }
}

/// Counts every modifier node (block, inline, or system) in the tree,
/// including inside un-stripped expansions. Handy for quick assertions in
/// tests without hand-rolling a visitor each time.
pub fn count_modifiers(blocks: &[BlockEntity]) -> usize {
    let mut count = 0;
    for block in blocks {
        match block {
            BlockEntity::Paragraph(p) => count += count_modifiers_inline(&p.content),
            BlockEntity::Preformatted(_) => {}
            BlockEntity::Block(m) => {
                count += 1;
                count += count_modifiers(&m.content);
                if let Some(expansion) = &m.expansion {
                    count += count_modifiers(expansion);
                }
            }
            BlockEntity::System(m) => {
                count += 1;
                count += count_modifiers(&m.content);
            }
        }
    }
    count
}

fn count_modifiers_inline(inlines: &[InlineEntity]) -> usize {
    let mut count = 0;
    for inline in inlines {
        if let InlineEntity::Inline(m) = inline {
            count += 1;
            count += count_modifiers_inline(&m.content);
            if let Some(expansion) = &m.expansion {
                count += count_modifiers_inline(expansion);
            }
        }
    }
    count
}
