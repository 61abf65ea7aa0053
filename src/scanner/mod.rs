// Character cursor over source text (spec §4.1, component C1).
//
// Positions are character (code point) offsets, not byte offsets (spec §6),
// so the scanner pre-indexes the source into a table of code points once at
// construction, the way the teacher's grammar layer pins down UTF-8/emoji
// boundaries explicitly (`core::logic::utf8`, `parser::shared`'s span tests)
// rather than assuming one byte equals one position.

use crate::ast::{LocationRange, SourceId};

/// Immutable view over a source string with a mutable cursor. Every method
/// that can advance the cursor does so in units of whole characters.
#[derive(Debug, Clone)]
pub struct Scanner {
    source_id: SourceId,
    chars: Vec<char>,
    cursor: usize,
}

impl Scanner {
    pub fn new(source_id: SourceId, text: &str) -> Self {
        Self {
            source_id,
            chars: text.chars().collect(),
            cursor: 0,
        }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// Current cursor position, in characters from the start of the source.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_eof(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    fn remaining(&self) -> &[char] {
        &self.chars[self.cursor..]
    }

    /// True iff `s` is a prefix of the text at the cursor. Never advances.
    pub fn peek(&self, s: &str) -> bool {
        let needle: Vec<char> = s.chars().collect();
        let rest = self.remaining();
        rest.len() >= needle.len() && rest[..needle.len()] == needle[..]
    }

    /// As `peek`, but advances past `s` on a match.
    pub fn accept(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.cursor += s.chars().count();
            true
        } else {
            false
        }
    }

    /// Advances one character and returns it, or `None` at EOF. Surrogate
    /// pairs never arise here since the source is decoded into `char`s
    /// (full code points) up front.
    pub fn accept_char(&mut self) -> Option<char> {
        let c = *self.chars.get(self.cursor)?;
        self.cursor += 1;
        Some(c)
    }

    /// Advances one character if it is whitespace other than a newline.
    pub fn accept_whitespace_char(&mut self) -> Option<char> {
        let c = *self.chars.get(self.cursor)?;
        if c != '\n' && c.is_whitespace() {
            self.cursor += 1;
            Some(c)
        } else {
            None
        }
    }

    /// Accepts characters up to (but not including) the next occurrence of
    /// `s`, returning the accepted text. Returns `None` if EOF is reached
    /// before `s` is found — in which case the cursor is left unmoved, so
    /// callers can fall back to a different strategy (spec: "null if EOF
    /// hit first").
    pub fn accept_until(&mut self, s: &str) -> Option<String> {
        let needle: Vec<char> = s.chars().collect();
        if needle.is_empty() {
            return Some(String::new());
        }
        let start = self.cursor;
        let mut i = start;
        while i + needle.len() <= self.chars.len() {
            if self.chars[i..i + needle.len()] == needle[..] {
                let text: String = self.chars[start..i].iter().collect();
                self.cursor = i;
                return Some(text);
            }
            i += 1;
        }
        None
    }

    /// Builds a `LocationRange` from `start` (a character offset captured
    /// earlier via [`Scanner::position`]) to the current cursor.
    pub fn range_from(&self, start: usize) -> LocationRange {
        LocationRange::new(self.source_id.clone(), start, self.cursor)
    }

    /// Slices the original text between two character offsets.
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// True if the character at the cursor is an identifier constituent
    /// (alphanumeric or `_`). Used to find the end of a bare interpolator
    /// reference like `$name` that has no closing postfix.
    pub fn at_identifier_char(&self) -> bool {
        match self.chars.get(self.cursor) {
            Some(c) => c.is_alphanumeric() || *c == '_',
            None => false,
        }
    }

    /// Everything from the cursor to the end of the source. Used sparingly,
    /// at modifier/interpolator boundaries, to test several candidate
    /// openers against the same position via `str::starts_with`.
    pub fn remaining_text(&self) -> String {
        self.chars[self.cursor..].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(s: &str) -> Scanner {
        Scanner::new(SourceId::new("t.emmm"), s)
    }

    #[test]
    fn peek_does_not_advance() {
        let mut sc = scanner("[.foo]");
        assert!(sc.peek("[."));
        assert_eq!(sc.position(), 0);
        assert!(sc.accept("[."));
        assert_eq!(sc.position(), 2);
    }

    #[test]
    fn accept_until_returns_none_at_eof() {
        let mut sc = scanner("no closing here");
        assert_eq!(sc.accept_until("]"), None);
        assert_eq!(sc.position(), 0);
    }

    #[test]
    fn character_offsets_count_code_points_not_bytes() {
        // "é" is 2 bytes in UTF-8 but one character.
        let mut sc = scanner("é]");
        let text = sc.accept_until("]").unwrap();
        assert_eq!(text, "é");
        assert_eq!(sc.position(), 1);
    }

    #[test]
    fn accept_whitespace_char_excludes_newline() {
        let mut sc = scanner(" \n\tx");
        assert_eq!(sc.accept_whitespace_char(), Some(' '));
        assert_eq!(sc.accept_whitespace_char(), None); // next is '\n'
        assert_eq!(sc.accept_char(), Some('\n'));
        assert_eq!(sc.accept_whitespace_char(), Some('\t'));
    }
}
