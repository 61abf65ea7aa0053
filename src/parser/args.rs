// Argument list grammar (spec §4.3's `ARGS`/`ARG`/`INTERP`), shared by all
// three modifier kinds and by shorthand argument collection.

use super::Parser;
use crate::ast::{ArgumentEntity, EscapedNode, InterpolationNode, LocationRange, ModifierArgument, TextNode};
use crate::config::ArgumentInterpolator;
use crate::diag::{Message, MessageCode};
use std::rc::Rc;

impl<'a> Parser<'a> {
    /// `ARGS := (':' | WS*) ARG (':' ARG)*`.
    pub(super) fn parse_args(&mut self) -> Vec<ModifierArgument> {
        let mut args = Vec::new();
        if !self.scanner.accept(":") {
            self.skip_horizontal_ws();
        }
        args.push(self.parse_one_arg());
        while self.scanner.accept(":") {
            args.push(self.parse_one_arg());
        }
        args
    }

    fn arg_stop(&self) -> bool {
        self.scanner.is_eof() || self.scanner.peek(":") || self.scanner.peek(";]") || self.scanner.peek("]")
    }

    fn parse_one_arg(&mut self) -> ModifierArgument {
        let start = self.scanner.position();
        let parts = self.parse_arg_entities(|p| p.arg_stop());
        let location = self.scanner.range_from(start);
        ModifierArgument::new(location, parts)
    }

    /// Collects `(TEXT | ESCAPED | INTERP)*` until `stop` reports true,
    /// coalescing consecutive plain characters into a single `Text` node.
    pub(super) fn parse_arg_entities(&mut self, stop: impl Fn(&Parser<'a>) -> bool) -> Vec<ArgumentEntity> {
        let mut parts = Vec::new();
        let mut text_buf = String::new();
        let mut text_start = self.scanner.position();

        while !stop(self) {
            if self.scanner.peek("\\") {
                if !text_buf.is_empty() {
                    parts.push(self.flush_text(&mut text_buf, text_start));
                }
                self.scanner.accept("\\");
                let esc_start = self.scanner.position();
                match self.scanner.accept_char() {
                    Some(c) => {
                        let location = self.scanner.range_from(esc_start);
                        parts.push(ArgumentEntity::Escaped(EscapedNode { location, content: c }));
                    }
                    None => break, // trailing backslash at EOF: nothing left to escape
                }
                text_start = self.scanner.position();
                continue;
            }

            if let Some(interp) = self.match_interpolator_opener() {
                if !text_buf.is_empty() {
                    parts.push(self.flush_text(&mut text_buf, text_start));
                }
                parts.push(self.parse_interpolation(interp, true));
                text_start = self.scanner.position();
                continue;
            }

            match self.scanner.accept_char() {
                Some(c) => text_buf.push(c),
                None => break,
            }
        }
        if !text_buf.is_empty() {
            parts.push(self.flush_text(&mut text_buf, text_start));
        }
        parts
    }

    fn flush_text(&self, buf: &mut String, start: usize) -> ArgumentEntity {
        let content = std::mem::take(buf);
        let location = self.scanner.range_from(start);
        ArgumentEntity::Text(TextNode { location, content })
    }

    /// Longest registered interpolator opener matching at the cursor, if
    /// any; advances past the opener literal on a match (spec §9: "Longest
    /// match applies to interpolator openers as well").
    fn match_interpolator_opener(&mut self) -> Option<Rc<ArgumentInterpolator>> {
        let remaining = self.scanner.remaining_text();
        let interp = self.cxt.configuration.argument_interpolators.longest_match(&remaining)?;
        self.scanner.accept(&interp.name);
        Some(interp)
    }

    /// `INTERP := name ARG postfix`. `name` was already consumed by the
    /// caller via [`Parser::match_interpolator_opener`].
    fn parse_interpolation(&mut self, interp: Rc<ArgumentInterpolator>, immediate: bool) -> ArgumentEntity {
        let start = self.scanner.position() - interp.name.chars().count();
        let inner_start = self.scanner.position();
        let argument = if interp.postfix.is_empty() {
            self.parse_arg_entities(|p| p.scanner.is_eof() || !p.scanner.at_identifier_char())
        } else {
            let postfix = interp.postfix.clone();
            self.parse_arg_entities(move |p| p.scanner.is_eof() || p.scanner.peek(&postfix))
        };
        let inner_end = self.scanner.position();

        if !interp.postfix.is_empty() && !self.scanner.accept(&interp.postfix) {
            let location = self.scanner.range_from(start);
            self.messages.push(Message::error(
                location,
                MessageCode::Expected,
                format!("expected closing `{}` for interpolator `{}`", interp.postfix, interp.name),
            ));
        }

        let raw = self.scanner.slice(inner_start, inner_end);
        let expansion = interp
            .expand
            .as_ref()
            .and_then(|expand| expand(&raw, self.cxt, immediate));
        let location = self.scanner.range_from(start);
        ArgumentEntity::Interpolation(InterpolationNode {
            location,
            name: interp.name.clone(),
            argument,
            expansion,
        })
    }
}
