// Universal properties a parse must hold regardless of input or
// configuration (SPEC_FULL.md §2.4 / spec.md §8's "TESTABLE PROPERTIES"),
// as opposed to tests/scenarios.rs's concrete worked examples.

use emmm_core::ast::traversal::walk_blocks;
use emmm_core::ast::{BlockEntity, Document, SourceId};
use emmm_core::config::{BlockModifierDef, Configuration, NoopBehavior};
use emmm_core::{parser, ParseContext};
use std::rc::Rc;

fn parse_plain(source: &str) -> Document {
    let mut cxt = ParseContext::new(Configuration::default());
    parser::parse(SourceId::new("t.emmm"), source, &mut cxt)
}

/// Every range a node carries has `start <= end`, and `actual_end` (when
/// present) never falls before `start` — a location that doesn't describe
/// a valid span would make every downstream offset (diagnostics, slicing
/// the source for a host UI) unreliable.
#[test]
fn range_monotonicity_holds_across_a_mixed_document() {
    let doc = parse_plain("[.quote]\nhello *world*\n\nsecond paragraph\n");
    let mut ranges = Vec::new();
    walk_blocks(&doc.root, &mut |loc| ranges.push(loc.clone()));
    assert!(!ranges.is_empty());
    for range in &ranges {
        assert!(range.start <= range.end, "{:?} has start after end", range);
        if let Some(actual_end) = range.actual_end {
            assert!(actual_end >= range.start, "{:?} has actual_end before start", range);
        }
    }
}

/// For a document with no modifiers at all, walking every leaf location
/// and concatenating the corresponding slices of the original source
/// reconstructs that source exactly — nothing is silently dropped.
#[test]
fn no_lost_characters_for_a_plain_paragraph() {
    let source = "hello world, this is a single paragraph";
    let doc = parse_plain(source);
    let mut reconstructed = String::new();
    walk_blocks(&doc.root, &mut |loc| {
        reconstructed.push_str(&source[loc.start..loc.end]);
    });
    assert_eq!(reconstructed, source);
}

/// A message raised for an unrecognized modifier points at the text that
/// actually named it, not some unrelated offset in the document.
#[test]
fn message_locations_point_at_the_text_that_caused_them() {
    let source = "[.unknown] hello";
    let doc = parse_plain(source);
    assert_eq!(doc.messages.len(), 1);
    let loc = doc.messages[0].location();
    assert!(loc.start <= loc.end);
    assert!(loc.end <= source.len());
    assert!(source[loc.start..loc.end].contains("unknown"), "message location was {:?}", &source[loc.start..loc.end]);
}

/// Stripping a document with no modifiers and no system directives is an
/// identity transform over its paragraph text.
#[test]
fn round_trip_for_strip_is_identity_without_modifiers() {
    let doc = parse_plain("first paragraph\n\nsecond paragraph\n");
    let stripped = doc.to_stripped();
    assert_eq!(stripped.root.len(), doc.root.len());
    for (original, strip) in doc.root.iter().zip(stripped.root.iter()) {
        match (original, strip) {
            (BlockEntity::Paragraph(a), BlockEntity::Paragraph(b)) => {
                let mut a_text = String::new();
                let mut b_text = String::new();
                // Compare flattened text rather than locations, since
                // `to_stripped` clones nodes but never mutates text.
                for inline in &a.content {
                    if let emmm_core::ast::InlineEntity::Text(t) = inline {
                        a_text.push_str(&t.content);
                    }
                }
                for inline in &b.content {
                    if let emmm_core::ast::InlineEntity::Text(t) = inline {
                        b_text.push_str(&t.content);
                    }
                }
                assert_eq!(a_text, b_text);
            }
            other => panic!("unexpected block shape: {:?}", other),
        }
    }
}

/// A deeply nested but non-recursive document still terminates: parsing a
/// document whose blocks each reference the one before it completes in
/// one call, never requiring an external iteration bound.
#[test]
fn termination_on_nested_groups() {
    let mut source = String::new();
    for _ in 0..50 {
        source.push_str(":--\n");
    }
    source.push_str("innermost\n");
    for _ in 0..50 {
        source.push_str("--:\n");
    }
    let doc = parse_plain(&source);
    assert!(doc.messages.iter().all(|m| m.code() != emmm_core::MessageCode::ReachedReparseLimit));
}

/// When two registered names overlap as prefixes, the registry always
/// resolves the longer one first.
#[test]
fn longest_registered_name_wins_on_overlap() {
    let mut cxt = ParseContext::new(Configuration::default());
    cxt.configuration
        .block_modifiers
        .add(Rc::new(BlockModifierDef::new("note", Rc::new(NoopBehavior))));
    cxt.configuration
        .block_modifiers
        .add(Rc::new(BlockModifierDef::new("notebox", Rc::new(NoopBehavior))));
    let found = cxt.configuration.block_modifiers.longest_match("noteboxed thing").unwrap();
    assert_eq!(found.name, "notebox");
}

/// `Configuration::from` produces an independent copy: mutating the clone's
/// registries never affects the original, and vice versa.
#[test]
fn configuration_cloning_is_idempotent() {
    let mut original = Configuration::default();
    original
        .block_modifiers
        .add(Rc::new(BlockModifierDef::new("quote", Rc::new(NoopBehavior))));

    let mut cloned = Configuration::from(&original);
    assert!(cloned.block_modifiers.has("quote"), "clone should start with the same entries");

    cloned.block_modifiers.add(Rc::new(BlockModifierDef::new("note", Rc::new(NoopBehavior))));
    assert!(!original.block_modifiers.has("note"), "mutating the clone must not reach back into the original");

    original.block_modifiers.add(Rc::new(BlockModifierDef::new("aside", Rc::new(NoopBehavior))));
    assert!(!cloned.block_modifiers.has("aside"), "mutating the original must not reach into an earlier clone");
}
