// Source identity and character-offset ranges shared by every AST node and
// every diagnostic message.

use std::sync::Arc;

/// Opaque handle naming a source (usually a filename, sometimes a
/// synthetic name like `"<shorthand expansion>"`). Cheap to clone and
/// compared by value, not identity, since two parses of the same file
/// legitimately share a `SourceId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceId(Arc<str>);

impl SourceId {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A half-open `[start, end)` character-offset range within a source,
/// optionally carrying `actual_end` (content end excluding a trailing
/// closing tag) and an `original` link back to the writing that produced
/// it when this range sits inside expanded/generated content.
///
/// `original` forms the referral chain described in spec §3: it never
/// cycles, because it is only ever set once, at the moment a generated
/// node is created from a modifier's `content`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocationRange {
    pub source: SourceId,
    pub start: usize,
    pub end: usize,
    pub actual_end: Option<usize>,
    pub original: Option<Box<LocationRange>>,
}

impl LocationRange {
    pub fn new(source: SourceId, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        Self {
            source,
            start,
            end,
            actual_end: None,
            original: None,
        }
    }

    pub fn with_actual_end(mut self, actual_end: usize) -> Self {
        self.actual_end = Some(actual_end);
        self
    }

    pub fn with_original(mut self, original: LocationRange) -> Self {
        self.original = Some(Box::new(original));
        self
    }

    /// Smallest range enclosing both `self` and `other`. Used when a node's
    /// span is built up from sub-spans (e.g. a modifier's head + content).
    pub fn join(&self, other: &LocationRange) -> LocationRange {
        debug_assert_eq!(self.source, other.source, "joined ranges must share a source");
        LocationRange {
            source: self.source.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            actual_end: None,
            original: None,
        }
    }

    /// Walks `original` links back to the root writing, the "true origin"
    /// a host UI would want to highlight first.
    pub fn root_original(&self) -> &LocationRange {
        let mut current = self;
        while let Some(original) = &current.original {
            current = original;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_picks_outer_bounds() {
        let src = SourceId::new("doc.emmm");
        let a = LocationRange::new(src.clone(), 4, 10);
        let b = LocationRange::new(src.clone(), 2, 6);
        let joined = a.join(&b);
        assert_eq!(joined.start, 2);
        assert_eq!(joined.end, 10);
    }

    #[test]
    fn root_original_follows_chain() {
        let src = SourceId::new("doc.emmm");
        let root = LocationRange::new(src.clone(), 0, 3);
        let mid = LocationRange::new(src.clone(), 10, 13).with_original(root.clone());
        let leaf = LocationRange::new(src.clone(), 20, 23).with_original(mid);
        assert_eq!(leaf.root_original(), &root);
    }
}
