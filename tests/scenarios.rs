// One file per spec concern (SPEC_FULL.md §2.4): spec.md §8's seven
// concrete scenarios, each checked against the stripped (rendering-ready)
// tree the way a host consuming `Document::to_stripped` would.

use emmm_core::ast::{BlockEntity, Document, InlineEntity, SourceId};
use emmm_core::config::{Configuration, ParseContext};
use emmm_core::{builtins, parser};

fn parse_plain(source: &str) -> Document {
    let mut cxt = ParseContext::new(Configuration::default());
    parser::parse(SourceId::new("t.emmm"), source, &mut cxt)
}

fn parse_with_builtins(source: &str) -> Document {
    let mut cxt = ParseContext::new(Configuration::default());
    builtins::install(&mut cxt);
    parser::parse(SourceId::new("t.emmm"), source, &mut cxt)
}

fn flatten_inline(inlines: &[InlineEntity]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            InlineEntity::Text(t) => out.push_str(&t.content),
            InlineEntity::Escaped(e) => out.push(e.content),
            InlineEntity::Inline(m) => {
                let content = m.expansion.as_deref().unwrap_or(&m.content);
                out.push_str(&flatten_inline(content));
            }
        }
    }
    out
}

fn paragraphs(doc: &Document) -> Vec<String> {
    doc.to_stripped()
        .root
        .iter()
        .filter_map(|b| match b {
            BlockEntity::Paragraph(p) => Some(flatten_inline(&p.content)),
            _ => None,
        })
        .collect()
}

/// Scenario 1: a marker-slot shorthand with no parameters; the shorthand's
/// own captured body (the text it was immediately followed by) is what a
/// later bare occurrence of the trigger expands to.
#[test]
fn scenario_1_marker_shorthand_reuses_its_captured_body() {
    let doc = parse_with_builtins("[-inline-shorthand p] 123\n\np");
    assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
    let ps = paragraphs(&doc);
    assert_eq!(ps.len(), 1, "expected a single paragraph, got {ps:?}");
    assert_eq!(ps[0].trim(), "123");
}

/// Scenario 2: a marker shorthand immediately closed with `;]` has an empty
/// captured body, so its later invocation expands to nothing.
#[test]
fn scenario_2_marker_shorthand_with_empty_body_expands_to_nothing() {
    let doc = parse_with_builtins("[-inline-shorthand p;]\n\np");
    assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
    let ps = paragraphs(&doc);
    assert_eq!(ps.len(), 1, "expected a single (possibly empty) paragraph, got {ps:?}");
    assert_eq!(ps[0], "");
}

/// Scenario 3: a one-argument shorthand whose body calls the built-in
/// `print` on the interpolated argument.
#[test]
fn scenario_3_shorthand_argument_reaches_print_via_interpolator() {
    let doc = parse_with_builtins("[-inline-shorthand p:x:p][/print $(x)]\n\np1p");
    assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
    let ps = paragraphs(&doc);
    assert_eq!(ps.len(), 1, "expected a single paragraph, got {ps:?}");
    assert_eq!(ps[0], "1");
}

/// Scenario 4: same shape as scenario 3, but the body surfaces the
/// argument through the bracket-syntax `$x` reference instead of `$(x)`.
#[test]
fn scenario_4_shorthand_argument_reaches_a_bare_param_ref() {
    let doc = parse_with_builtins("[-inline-shorthand p:x:p][/$x]\n\np1p");
    assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
    let ps = paragraphs(&doc);
    assert_eq!(ps.len(), 1, "expected a single paragraph, got {ps:?}");
    assert_eq!(ps[0], "1");
}

/// Scenario 5: an unrecognized block modifier name degrades to a single
/// `UnknownModifier` error while the rest of the line is kept as a paragraph.
#[test]
fn scenario_5_unknown_block_modifier_keeps_going() {
    let doc = parse_plain("[.unknown] hello");
    assert_eq!(doc.messages.len(), 1, "expected exactly one message, got {:?}", doc.messages);
    assert_eq!(doc.messages[0].code(), emmm_core::MessageCode::UnknownModifier);
    let ps = paragraphs(&doc);
    assert_eq!(ps.len(), 1);
    assert_eq!(ps[0].trim(), "hello");
}

/// Scenario 6: a group has no AST node of its own; its content splices
/// into the surrounding block sequence as ordinary paragraphs.
#[test]
fn scenario_6_group_splices_its_paragraphs_into_the_parent() {
    let doc = parse_plain(":--\nhello\n--:\nworld");
    assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
    let ps = paragraphs(&doc);
    assert_eq!(ps, vec!["hello".to_string(), "world".to_string()]);
}

/// Scenario 7: a modifier whose own expansion invokes itself is bounded by
/// `reparseDepthLimit`, producing exactly one `ReachedReparseLimit` error
/// rather than looping forever. Each invocation re-parses its captured
/// template through a fresh parser, so the bound is carried on
/// `ParseContext` rather than the parser's own call stack
/// (`builtins::params::{enter,exit}_expansion`).
#[test]
fn scenario_7_self_referential_expansion_is_depth_limited() {
    let doc = parse_with_builtins("[-define-block loop]\n[.loop]\n\n[.loop]\n");
    let reparse_limit_hits: Vec<_> = doc
        .messages
        .iter()
        .filter(|m| m.code() == emmm_core::MessageCode::ReachedReparseLimit)
        .collect();
    assert_eq!(
        reparse_limit_hits.len(),
        1,
        "expected exactly one ReachedReparseLimit message, got {:?}",
        doc.messages
    );
}

/// Scenario 8: a shorthand with two named positional arguments ahead of its
/// content slot (`arg₀ part₀ arg₁ part₁ … slot postfix`) binds both, not
/// just the trailing slot — the same `$name`/`$(name)` reachability
/// `.define-block`/`.define-inline` give every one of their non-slot names.
#[test]
fn scenario_8_shorthand_with_two_named_arguments_binds_both() {
    let doc = parse_with_builtins("[-inline-shorthand m:A:B:x:z][/print $(A)-$(B)]\n\nm1A2Bcontentz");
    assert!(doc.messages.is_empty(), "unexpected messages: {:?}", doc.messages);
    let ps = paragraphs(&doc);
    assert_eq!(ps.len(), 1, "expected a single paragraph, got {ps:?}");
    assert_eq!(ps[0], "1-2");
}
