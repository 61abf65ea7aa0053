// Renderer framework (spec.md §4.5, component C6): dispatch discipline,
// not any particular output format — mirrors the teacher's `render::mod`
// top-level `render(document, options) -> Result<String>` entry plus a
// small `RenderOptions`-style config payload, generalized to EMMM's
// per-modifier-identity dispatch instead of a fixed Markdown tag set.
//
// `render::html_demo` plays the role of the teacher's own `render::html`:
// a concrete, illustrative back-end proving the dispatch discipline
// compiles and round-trips, not a specified output format.

pub mod html_demo;

use crate::ast::{BlockEntity, BlockModifierNode, Document, InlineEntity, InlineModifierNode};
use crate::config::{BlockModifierDef, InlineModifierDef};
use std::collections::HashMap;
use std::rc::Rc;

type BlockRenderer<T> = Rc<dyn Fn(&BlockModifierNode, &RendererConfiguration<T>, &mut RenderState<T>) -> String>;
type InlineRenderer<T> = Rc<dyn Fn(&InlineModifierNode, &RendererConfiguration<T>, &mut RenderState<T>) -> String>;

/// Identity of a registered definition: `Rc::as_ptr` cast to a thin pointer,
/// matching spec.md §4.5 "keyed by modifier definition identity" rather
/// than by name (two distinct definitions can share a name across a
/// `.define-*` redefinition during one parse).
fn identity<D>(def: &Rc<D>) -> usize {
    Rc::as_ptr(def) as *const () as usize
}

/// `(blockRenderers, inlineRenderers)` plus the `invalidBlock`/`invalidInline`
/// fallback from spec.md §4.5, generic over a host payload `T` the way the
/// teacher's `RenderOptions` is a plain, `Default`-able config struct
/// threaded through the render call by reference.
pub struct RendererConfiguration<T> {
    block_renderers: HashMap<usize, BlockRenderer<T>>,
    inline_renderers: HashMap<usize, InlineRenderer<T>>,
    invalid_block: Rc<dyn Fn(&BlockModifierNode, &str) -> String>,
    invalid_inline: Rc<dyn Fn(&InlineModifierNode, &str) -> String>,
    /// Wraps a paragraph's already-rendered inline content. Paragraphs
    /// carry no definition to register a renderer against, so the default
    /// is a pass-through; a host back-end (e.g. `html_demo`) overrides it
    /// to add its own wrapping tag.
    paragraph_wrap: Rc<dyn Fn(String, &mut RenderState<T>) -> String>,
    /// Renders a preformatted block's raw text, same reasoning as `paragraph_wrap`.
    preformatted_render: Rc<dyn Fn(&str, &mut RenderState<T>) -> String>,
}

impl<T> RendererConfiguration<T> {
    pub fn new() -> Self {
        Self {
            block_renderers: HashMap::new(),
            inline_renderers: HashMap::new(),
            invalid_block: Rc::new(|_node, _reason| String::new()),
            invalid_inline: Rc::new(|_node, _reason| String::new()),
            paragraph_wrap: Rc::new(|content, _state| content),
            preformatted_render: Rc::new(|text, _state| text.to_string()),
        }
    }

    pub fn register_block(
        &mut self,
        def: &Rc<BlockModifierDef>,
        renderer: impl Fn(&BlockModifierNode, &RendererConfiguration<T>, &mut RenderState<T>) -> String + 'static,
    ) {
        self.block_renderers.insert(identity(def), Rc::new(renderer));
    }

    pub fn register_inline(
        &mut self,
        def: &Rc<InlineModifierDef>,
        renderer: impl Fn(&InlineModifierNode, &RendererConfiguration<T>, &mut RenderState<T>) -> String + 'static,
    ) {
        self.inline_renderers.insert(identity(def), Rc::new(renderer));
    }

    pub fn with_invalid_block(mut self, f: impl Fn(&BlockModifierNode, &str) -> String + 'static) -> Self {
        self.invalid_block = Rc::new(f);
        self
    }

    pub fn with_invalid_inline(mut self, f: impl Fn(&InlineModifierNode, &str) -> String + 'static) -> Self {
        self.invalid_inline = Rc::new(f);
        self
    }

    pub fn with_paragraph_wrap(mut self, f: impl Fn(String, &mut RenderState<T>) -> String + 'static) -> Self {
        self.paragraph_wrap = Rc::new(f);
        self
    }

    pub fn with_preformatted_render(mut self, f: impl Fn(&str, &mut RenderState<T>) -> String + 'static) -> Self {
        self.preformatted_render = Rc::new(f);
        self
    }
}

impl<T> Default for RendererConfiguration<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable per-render side-channel (spec.md §4.5: "CSS variables,
/// stylesheet, collected counters"), exclusively owned by one render
/// invocation (spec.md §6's shared-resource policy) — `host` is whatever a
/// concrete back-end needs (e.g. `html_demo::HtmlHost`'s footnote list).
pub struct RenderState<T> {
    pub host: T,
}

impl<T: Default> RenderState<T> {
    pub fn new() -> Self {
        Self { host: T::default() }
    }
}

impl<T: Default> Default for RenderState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level entry point (spec.md §4.5: `Renderer.render(nodes, state) ->
/// output`), walking `document`'s full (unstripped) tree so modifier
/// identity is still available for dispatch.
pub fn render_document<T>(document: &Document, cxt: &RendererConfiguration<T>, state: &mut RenderState<T>) -> String {
    log::info!("rendering {} top-level block(s)", document.root.len());
    render_blocks(&document.root, cxt, state)
}

pub fn render_blocks<T>(blocks: &[BlockEntity], cxt: &RendererConfiguration<T>, state: &mut RenderState<T>) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str(&render_block(block, cxt, state));
    }
    out
}

fn render_block<T>(block: &BlockEntity, cxt: &RendererConfiguration<T>, state: &mut RenderState<T>) -> String {
    match block {
        BlockEntity::Paragraph(p) => (cxt.paragraph_wrap)(render_inlines(&p.content, cxt, state), state),
        BlockEntity::Preformatted(p) => (cxt.preformatted_render)(&p.content.text, state),
        BlockEntity::Block(node) => render_block_modifier(node, cxt, state),
        // A system modifier never reaches the renderer in a well-formed
        // document (it exists only to mutate Configuration mid-parse);
        // render it as nothing rather than panic on a malformed tree.
        BlockEntity::System(_) => String::new(),
    }
}

/// Dispatch order per spec.md §4.5: a registered renderer for this node's
/// definition identity runs first; otherwise its `expansion` (if any) is
/// rendered in its place; failing that, `invalidBlock` is invoked.
fn render_block_modifier<T>(node: &BlockModifierNode, cxt: &RendererConfiguration<T>, state: &mut RenderState<T>) -> String {
    if let Some(renderer) = cxt.block_renderers.get(&identity(&node.definition)) {
        return renderer(node, cxt, state);
    }
    if let Some(expansion) = &node.expansion {
        return render_blocks(expansion, cxt, state);
    }
    log::warn!("no renderer and no expansion for block modifier `{}`", node.definition.name);
    (cxt.invalid_block)(node, "no renderer registered and no expansion available")
}

pub fn render_inlines<T>(inlines: &[InlineEntity], cxt: &RendererConfiguration<T>, state: &mut RenderState<T>) -> String {
    let mut out = String::new();
    for inline in inlines {
        out.push_str(&render_inline(inline, cxt, state));
    }
    out
}

fn render_inline<T>(inline: &InlineEntity, cxt: &RendererConfiguration<T>, state: &mut RenderState<T>) -> String {
    match inline {
        InlineEntity::Text(t) => t.content.clone(),
        InlineEntity::Escaped(e) => e.content.to_string(),
        InlineEntity::Inline(node) => render_inline_modifier(node, cxt, state),
    }
}

fn render_inline_modifier<T>(node: &InlineModifierNode, cxt: &RendererConfiguration<T>, state: &mut RenderState<T>) -> String {
    if let Some(renderer) = cxt.inline_renderers.get(&identity(&node.definition)) {
        return renderer(node, cxt, state);
    }
    if let Some(expansion) = &node.expansion {
        return render_inlines(expansion, cxt, state);
    }
    log::warn!("no renderer and no expansion for inline modifier `{}`", node.definition.name);
    (cxt.invalid_inline)(node, "no renderer registered and no expansion available")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LocationRange, ParagraphNode, SourceId, TextNode};

    fn loc() -> LocationRange {
        LocationRange::new(SourceId::new("t"), 0, 0)
    }

    #[test]
    fn paragraph_renders_inline_text_through_default_wrap() {
        let doc = Document::new(
            SourceId::new("t"),
            vec![BlockEntity::Paragraph(ParagraphNode {
                location: loc(),
                content: vec![InlineEntity::Text(TextNode { location: loc(), content: "hi".into() })],
            })],
            Vec::new(),
        );
        let cxt: RendererConfiguration<()> = RendererConfiguration::new();
        let mut state = RenderState::new();
        assert_eq!(render_document(&doc, &cxt, &mut state), "hi");
    }

    #[test]
    fn custom_paragraph_wrap_is_applied() {
        let doc = Document::new(
            SourceId::new("t"),
            vec![BlockEntity::Paragraph(ParagraphNode {
                location: loc(),
                content: vec![InlineEntity::Text(TextNode { location: loc(), content: "hi".into() })],
            })],
            Vec::new(),
        );
        let cxt: RendererConfiguration<()> =
            RendererConfiguration::new().with_paragraph_wrap(|content, _state| format!("<p>{content}</p>"));
        let mut state = RenderState::new();
        assert_eq!(render_document(&doc, &cxt, &mut state), "<p>hi</p>");
    }
}
