// Diagnostic messages: data, not control flow (spec §7). Every parser
// operation accumulates `Message`s into the document instead of aborting.

mod code;

pub use code::MessageCode;

use crate::ast::LocationRange;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A suggested text edit a host UI may offer, never applied automatically
/// (spec §7). The edit itself is a pure function over the source and a
/// cursor offset so it can be previewed before being applied.
#[derive(Clone)]
pub struct FixSuggestion {
    pub note: String,
    apply: Arc<dyn Fn(&str, usize) -> (String, usize) + Send + Sync>,
}

impl FixSuggestion {
    pub fn new(
        note: impl Into<String>,
        apply: impl Fn(&str, usize) -> (String, usize) + Send + Sync + 'static,
    ) -> Self {
        Self {
            note: note.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn apply(&self, source: &str, cursor: usize) -> (String, usize) {
        (self.apply)(source, cursor)
    }
}

impl std::fmt::Debug for FixSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixSuggestion").field("note", &self.note).finish()
    }
}

/// A single diagnostic, or a diagnostic wrapped with the location of an
/// enclosing expansion it was raised while reparsing (spec's
/// `ReferredMessage`). Wrapping nests one frame per enclosing expansion, so
/// a UI can walk from `location()` (the true origin) out through
/// `referral_chain()` to the site that ultimately caused the expansion.
#[derive(Debug, Clone)]
pub enum Message {
    Direct(MessageBody),
    Referred { at: LocationRange, inner: Box<Message> },
}

#[derive(Debug, Clone)]
pub struct MessageBody {
    pub severity: Severity,
    pub location: LocationRange,
    pub code: MessageCode,
    pub info: String,
    pub fixes: Vec<FixSuggestion>,
}

impl Message {
    pub fn new(severity: Severity, location: LocationRange, code: MessageCode, info: impl Into<String>) -> Self {
        Message::Direct(MessageBody {
            severity,
            location,
            code,
            info: info.into(),
            fixes: Vec::new(),
        })
    }

    pub fn error(location: LocationRange, code: MessageCode, info: impl Into<String>) -> Self {
        Self::new(Severity::Error, location, code, info)
    }

    pub fn warning(location: LocationRange, code: MessageCode, info: impl Into<String>) -> Self {
        Self::new(Severity::Warning, location, code, info)
    }

    pub fn with_fix(mut self, fix: FixSuggestion) -> Self {
        if let Message::Direct(body) = &mut self {
            body.fixes.push(fix);
        }
        self
    }

    /// Wraps this message as having been raised while reparsing content
    /// generated at `at` — one frame per enclosing expansion.
    pub fn referred_at(self, at: LocationRange) -> Message {
        Message::Referred { at, inner: Box::new(self) }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Message::Direct(body) => body.severity,
            Message::Referred { inner, .. } => inner.severity(),
        }
    }

    /// The true origin of the message, following §3's referral chain back
    /// to the innermost (originally authored) range.
    pub fn location(&self) -> &LocationRange {
        match self {
            Message::Direct(body) => &body.location,
            Message::Referred { inner, .. } => inner.location(),
        }
    }

    pub fn code(&self) -> MessageCode {
        match self {
            Message::Direct(body) => body.code,
            Message::Referred { inner, .. } => inner.code(),
        }
    }

    /// Enclosing expansion sites, outermost first, excluding the true origin.
    pub fn referral_chain(&self) -> Vec<&LocationRange> {
        let mut chain = Vec::new();
        let mut current = self;
        while let Message::Referred { at, inner } = current {
            chain.push(at);
            current = inner;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceId;

    fn loc(start: usize, end: usize) -> LocationRange {
        LocationRange::new(SourceId::new("t.emmm"), start, end)
    }

    #[test]
    fn referred_message_preserves_original_location() {
        let base = Message::error(loc(5, 8), MessageCode::UnknownModifier, "unknown modifier `x`");
        let wrapped = base.referred_at(loc(20, 30));
        assert_eq!(wrapped.location().start, 5);
        assert_eq!(wrapped.severity(), Severity::Error);
        assert_eq!(wrapped.referral_chain().len(), 1);
    }
}
