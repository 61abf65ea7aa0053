// Leaf and composite AST node kinds (spec §3).

use super::location::LocationRange;
use super::modifier::{BlockModifierNode, InlineModifierNode, SystemModifierNode};

#[derive(Debug, Clone)]
pub struct TextNode {
    pub location: LocationRange,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct EscapedNode {
    pub location: LocationRange,
    pub content: char,
}

#[derive(Debug, Clone)]
pub struct ParagraphNode {
    pub location: LocationRange,
    pub content: Vec<InlineEntity>,
}

#[derive(Debug, Clone)]
pub struct PreformattedContent {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PreformattedNode {
    pub location: LocationRange,
    pub content: PreformattedContent,
}

/// The inner `ARG` of an interpolator, plus the cached textual expansion
/// its `ArgumentInterpolator::expand` produced (spec §3/§4.3: `INTERP :=
/// name ARG postfix`).
#[derive(Debug, Clone)]
pub struct InterpolationNode {
    pub location: LocationRange,
    pub name: String,
    pub argument: Vec<ArgumentEntity>,
    pub expansion: Option<String>,
}

/// A block-level entity: the content type of `Root`, `Paragraph`'s
/// siblings, block/system modifier content, and block modifier expansions.
#[derive(Debug, Clone)]
pub enum BlockEntity {
    Paragraph(ParagraphNode),
    Preformatted(PreformattedNode),
    Block(BlockModifierNode),
    System(SystemModifierNode),
}

/// An inline-level entity: the content of a `Paragraph` or inline modifier.
#[derive(Debug, Clone)]
pub enum InlineEntity {
    Text(TextNode),
    Escaped(EscapedNode),
    Inline(InlineModifierNode),
}

/// An entity inside a `ModifierArgument`.
#[derive(Debug, Clone)]
pub enum ArgumentEntity {
    Text(TextNode),
    Escaped(EscapedNode),
    Interpolation(InterpolationNode),
}

macro_rules! location_accessor {
    ($ty:ty, $( $variant:ident ),+ $(,)?) => {
        impl $ty {
            pub fn location(&self) -> &LocationRange {
                match self {
                    $( Self::$variant(n) => &n.location, )+
                }
            }
        }
    };
}

location_accessor!(BlockEntity, Paragraph, Preformatted, Block, System);
location_accessor!(InlineEntity, Text, Escaped, Inline);
location_accessor!(ArgumentEntity, Text, Escaped, Interpolation);
