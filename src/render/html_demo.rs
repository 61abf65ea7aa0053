// Illustrative HTML back-end (spec.md §4.5, "an HTML back-end is
// illustrated but not specified bit-exactly"), directly analogous to the
// teacher's own `render::html`: a small, concrete `render_node`-shaped
// mapping proving the dispatch discipline compiles and round-trips, not a
// specified output format.
//
// Registers renderers for `quote`, `note`, `em`, `strong` against the
// identity handles on `builtins::Builtins`. `print` needs none: its
// `expand()` already produces plain text, which the default dispatch falls
// through to via `node.expansion`.

use super::{render_blocks, render_inlines, RenderState, RendererConfiguration};
use crate::builtins::Builtins;

/// Per-render side-channel: footnotes collected by `note` as the tree is
/// walked, rendered as a trailing `<ol>` by the caller once rendering
/// finishes (spec.md §4.5: "collected counters").
#[derive(Debug, Default)]
pub struct HtmlHost {
    pub footnotes: Vec<String>,
}

impl HtmlHost {
    /// `<ol>` of every footnote `note` collected during the render that
    /// just finished; empty string if none were seen.
    pub fn render_footnotes(&self) -> String {
        if self.footnotes.is_empty() {
            return String::new();
        }
        let mut out = String::from("<ol class=\"footnotes\">\n");
        for note in &self.footnotes {
            out.push_str(&format!("<li>{note}</li>\n"));
        }
        out.push_str("</ol>\n");
        out
    }
}

/// Builds an HTML `RendererConfiguration` wired against `builtins`' own
/// definition handles — no name-based lookup, matching spec.md §4.5's
/// "keyed by modifier definition identity".
pub fn configure(builtins: &Builtins) -> RendererConfiguration<HtmlHost> {
    let mut cxt: RendererConfiguration<HtmlHost> = RendererConfiguration::new()
        .with_paragraph_wrap(|content, _state| format!("<p>{content}</p>\n"))
        .with_preformatted_render(|text, _state| format!("<pre>{}</pre>\n", escape(text)))
        .with_invalid_block(|node, reason| format!("<!-- invalid block `{}`: {reason} -->\n", node.definition.name))
        .with_invalid_inline(|node, reason| format!("<!-- invalid inline `{}`: {reason} -->", node.definition.name));

    cxt.register_block(&builtins.quote, |node, cxt, state| {
        format!("<blockquote>{}</blockquote>\n", render_blocks(&node.content, cxt, state))
    });

    cxt.register_block(&builtins.note, |node, cxt, state| {
        let text = render_blocks(&node.content, cxt, state);
        state.host.footnotes.push(text);
        format!("<sup>[{}]</sup>", state.host.footnotes.len())
    });

    cxt.register_inline(&builtins.em, |node, cxt, state| {
        format!("<em>{}</em>", render_inlines(&node.content, cxt, state))
    });

    cxt.register_inline(&builtins.strong, |node, cxt, state| {
        format!("<strong>{}</strong>", render_inlines(&node.content, cxt, state))
    });

    cxt
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceId;
    use crate::config::{Configuration, ParseContext};
    use crate::parser::parse;

    #[test]
    fn quote_renders_as_blockquote() {
        let mut cxt = ParseContext::new(Configuration::default());
        let builtins = crate::builtins::install(&mut cxt);
        let doc = parse(SourceId::new("t.emmm"), "[.quote]\nhello\n", &mut cxt);
        assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);

        let renderer = configure(&builtins);
        let mut state = RenderState::new();
        let html = super::super::render_document(&doc, &renderer, &mut state);
        assert_eq!(html, "<blockquote><p>hello</p>\n</blockquote>\n");
    }

    #[test]
    fn note_collects_a_footnote_and_renders_a_marker() {
        let mut cxt = ParseContext::new(Configuration::default());
        let builtins = crate::builtins::install(&mut cxt);
        let doc = parse(SourceId::new("t.emmm"), "[.note]\naside\n", &mut cxt);
        assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);

        let renderer = configure(&builtins);
        let mut state = RenderState::new();
        let html = super::super::render_document(&doc, &renderer, &mut state);
        assert_eq!(html, "<sup>[1]</sup>");
        assert_eq!(state.host.footnotes, vec!["<p>aside</p>\n".to_string()]);
    }

    #[test]
    fn em_and_strong_nest_correctly() {
        let mut cxt = ParseContext::new(Configuration::default());
        let builtins = crate::builtins::install(&mut cxt);
        let doc = parse(SourceId::new("t.emmm"), "[/strong][/em]hi[;][;]\n", &mut cxt);
        assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);

        let renderer = configure(&builtins);
        let mut state = RenderState::new();
        let html = super::super::render_document(&doc, &renderer, &mut state);
        assert_eq!(html, "<p><strong><em>hi</em></strong></p>\n");
    }
}
