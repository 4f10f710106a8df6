//! Recursive descent parser for chip definitions.
//!
//! The [`HdlParser`] provides the primitive operations (advance, expect, eat)
//! and the grammar rules. Rules return `Option`: `None` means an error was
//! already reported and the caller should resynchronize.

use crate::ast::*;
use crate::token::{HdlToken, Token};
use gatesim_common::{Ident, Interner};
use gatesim_diagnostics::code::{Category, DiagnosticCode};
use gatesim_diagnostics::{Diagnostic, DiagnosticSink};
use gatesim_source::Span;

/// Syntax error.
pub const E101: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);

/// A recursive descent parser over a token stream.
pub struct HdlParser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
    interner: &'src Interner,
    sink: &'src DiagnosticSink,
}

impl<'src> HdlParser<'src> {
    /// Creates a new parser from a token stream ending in [`HdlToken::Eof`].
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            interner,
            sink,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    fn current(&self) -> HdlToken {
        self.tokens[self.pos].kind
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn current_text(&self) -> &'src str {
        let span = self.current_span();
        &self.source[span.start as usize..span.end as usize]
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn at(&self, kind: HdlToken) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.at(HdlToken::Eof)
    }

    fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: HdlToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: HdlToken) -> Option<Span> {
        let span = self.current_span();
        if self.eat(kind) {
            Some(span)
        } else {
            self.expected(kind.describe());
            None
        }
    }

    fn expect_ident(&mut self) -> Option<(Ident, Span)> {
        if self.at(HdlToken::Identifier) {
            let ident = self.interner.get_or_intern(self.current_text());
            let span = self.current_span();
            self.advance();
            Some((ident, span))
        } else {
            self.expected("identifier");
            None
        }
    }

    fn expect_number(&mut self) -> Option<u32> {
        if !self.at(HdlToken::Number) {
            self.expected("number");
            return None;
        }
        match self.current_text().parse::<u32>() {
            Ok(n) => {
                self.advance();
                Some(n)
            }
            Err(_) => {
                self.error("number is too large");
                None
            }
        }
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    fn error(&self, msg: &str) {
        self.sink
            .emit(Diagnostic::error(E101, msg, self.current_span()));
    }

    fn expected(&self, what: &str) {
        self.sink.emit(Diagnostic::error(
            E101,
            format!("expected {what}, found {}", self.current().describe()),
            self.current_span(),
        ));
    }

    /// Skips to just past the next `;`, stopping early at `}` or end of file.
    fn recover_to_statement_end(&mut self) {
        while !self.at_eof() && !self.at(HdlToken::RightBrace) {
            if self.eat(HdlToken::Semicolon) {
                return;
            }
            self.advance();
        }
    }

    /// Like [`recover_to_statement_end`](Self::recover_to_statement_end),
    /// but also stops before the keyword opening the next section.
    fn recover_to_section(&mut self) {
        loop {
            match self.current() {
                HdlToken::Eof
                | HdlToken::RightBrace
                | HdlToken::In
                | HdlToken::Out
                | HdlToken::Parts
                | HdlToken::Chip => return,
                HdlToken::Semicolon => {
                    self.advance();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    // ========================================================================
    // Grammar rules
    // ========================================================================

    /// Parses a complete file.
    pub fn parse_file(&mut self) -> HdlFile {
        let start = self.current_span();
        let mut chips = Vec::new();

        while !self.at_eof() {
            if self.at(HdlToken::Chip) {
                match self.parse_chip() {
                    Some(chip) => chips.push(ChipItem::Chip(chip)),
                    None => chips.push(ChipItem::Error(self.skip_to_next_chip())),
                }
            } else {
                self.expected(HdlToken::Chip.describe());
                chips.push(ChipItem::Error(self.skip_to_next_chip()));
            }
        }

        HdlFile {
            chips,
            span: start.merge(self.prev_span()),
        }
    }

    fn skip_to_next_chip(&mut self) -> Span {
        let start = self.current_span();
        while !self.at_eof() && !self.at(HdlToken::Chip) {
            self.advance();
        }
        start.merge(self.prev_span())
    }

    fn parse_chip(&mut self) -> Option<Chip> {
        let start = self.expect(HdlToken::Chip)?;
        let (name, name_span) = self.expect_ident()?;
        self.expect(HdlToken::LeftBrace)?;

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut parts = Vec::new();

        loop {
            match self.current() {
                HdlToken::In => {
                    self.advance();
                    self.parse_pin_list(&mut inputs);
                }
                HdlToken::Out => {
                    self.advance();
                    self.parse_pin_list(&mut outputs);
                }
                HdlToken::Parts => {
                    self.advance();
                    if self.expect(HdlToken::Colon).is_some() {
                        self.parse_parts(&mut parts);
                    } else {
                        self.recover_to_section();
                    }
                }
                HdlToken::RightBrace | HdlToken::Eof | HdlToken::Chip => break,
                _ => {
                    self.expected("`IN`, `OUT`, `PARTS` or `}`");
                    self.advance();
                    self.recover_to_section();
                }
            }
        }

        let end = self.expect(HdlToken::RightBrace)?;
        Some(Chip {
            name,
            name_span,
            inputs,
            outputs,
            parts,
            span: start.merge(end),
        })
    }

    fn parse_pin_list(&mut self, pins: &mut Vec<PinDecl>) {
        loop {
            match self.parse_pin_decl() {
                Some(pin) => pins.push(pin),
                None => {
                    self.recover_to_section();
                    return;
                }
            }
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        if self.expect(HdlToken::Semicolon).is_none() {
            self.recover_to_section();
        }
    }

    fn parse_pin_decl(&mut self) -> Option<PinDecl> {
        let (name, span) = self.expect_ident()?;
        let mut width = None;
        if self.eat(HdlToken::LeftBracket) {
            width = Some(self.expect_number()?);
            self.expect(HdlToken::RightBracket)?;
        }
        Some(PinDecl {
            name,
            width,
            span: span.merge(self.prev_span()),
        })
    }

    fn parse_parts(&mut self, parts: &mut Vec<PartInstance>) {
        while !self.at_eof() && !self.at(HdlToken::RightBrace) {
            match self.parse_part() {
                Some(part) => parts.push(part),
                None => self.recover_to_statement_end(),
            }
        }
    }

    fn parse_part(&mut self) -> Option<PartInstance> {
        let (chip, start) = self.expect_ident()?;
        self.expect(HdlToken::LeftParen)?;
        let mut bindings = Vec::new();
        if !self.at(HdlToken::RightParen) {
            loop {
                bindings.push(self.parse_binding()?);
                if !self.eat(HdlToken::Comma) {
                    break;
                }
            }
        }
        self.expect(HdlToken::RightParen)?;
        let end = self.expect(HdlToken::Semicolon)?;
        Some(PartInstance {
            chip,
            bindings,
            span: start.merge(end),
        })
    }

    fn parse_binding(&mut self) -> Option<Binding> {
        let jam = self.parse_name_ref()?;
        self.expect(HdlToken::Equals)?;
        let pin = self.parse_name_ref()?;
        Some(Binding {
            span: jam.span.merge(pin.span),
            jam,
            pin,
        })
    }

    fn parse_name_ref(&mut self) -> Option<NameRef> {
        let (name, span) = self.expect_ident()?;
        let mut range = None;
        if self.at(HdlToken::LeftBracket) {
            let open = self.current_span();
            self.advance();
            let first = self.expect_number()?;
            let last = if self.eat(HdlToken::DotDot) {
                self.expect_number()?
            } else {
                first
            };
            let close = self.expect(HdlToken::RightBracket)?;
            range = Some(RangeSpec {
                first,
                last,
                span: open.merge(close),
            });
        }
        Some(NameRef {
            name,
            range,
            span: span.merge(self.prev_span()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use gatesim_source::FileId;

    fn parse(source: &str) -> (HdlFile, Interner, DiagnosticSink) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let tokens = lex(source, FileId::from_raw(0), &sink);
        let file = HdlParser::new(tokens, source, &interner, &sink).parse_file();
        (file, interner, sink)
    }

    #[test]
    fn parse_pin_declarations() {
        let (file, interner, sink) = parse("CHIP Add16 { IN a[16], b[16], carry; OUT out[16]; PARTS: }");
        assert!(!sink.has_errors());
        let chip = file.chip_defs().next().unwrap();
        assert_eq!(interner.resolve(chip.name), "Add16");
        assert_eq!(chip.inputs.len(), 3);
        assert_eq!(chip.inputs[0].width, Some(16));
        assert_eq!(chip.inputs[2].bit_width(), 1);
        assert_eq!(chip.outputs[0].bit_width(), 16);
        assert!(chip.parts.is_empty());
    }

    #[test]
    fn parse_parts_and_ranges() {
        let (file, interner, sink) = parse(
            "CHIP Low { IN in[8]; OUT out[2]; PARTS:
                Not(in=in[0], out=out[0]);
                Not(in=in[1..1], out=out[1]);
            }",
        );
        assert!(!sink.has_errors());
        let chip = file.chip_defs().next().unwrap();
        assert_eq!(chip.parts.len(), 2);
        let b = &chip.parts[1].bindings[0];
        assert_eq!(interner.resolve(b.jam.name), "in");
        let range = b.pin.range.unwrap();
        assert_eq!((range.first, range.last), (1, 1));
        let b = &chip.parts[0].bindings[1];
        assert_eq!(b.pin.range.map(|r| (r.first, r.last)), Some((0, 0)));
    }

    #[test]
    fn missing_semicolon_recovers_to_next_part() {
        let (file, _, sink) = parse(
            "CHIP Bad { IN a; OUT out; PARTS:
                Not(in=a, out=x)
                Not(in=x, out=out);
            }",
        );
        assert!(sink.has_errors());
        assert_eq!(file.chip_defs().count(), 1);
    }

    #[test]
    fn missing_semicolon_after_pins_keeps_next_section() {
        let (file, _, sink) = parse(
            "CHIP Bad {
                IN a, b
                OUT out
                PARTS:
                And(a=a, b=b, out=out)
            }",
        );
        let msgs: Vec<_> = sink.take_all().into_iter().map(|d| d.message).collect();
        assert_eq!(
            msgs,
            vec![
                "expected `;`, found `OUT`",
                "expected `;`, found `PARTS`",
                "expected `;`, found `}`",
            ]
        );
        let chip = file.chip_defs().next().unwrap();
        assert_eq!(chip.inputs.len(), 2);
        assert_eq!(chip.outputs.len(), 1);
    }

    #[test]
    fn bad_chip_then_good_chip() {
        let (file, interner, sink) = parse(
            "CHIP { IN a; }
             CHIP Good { IN a; OUT out; PARTS: Not(in=a, out=out); }",
        );
        assert!(sink.has_errors());
        let names: Vec<_> = file.chip_defs().map(|c| interner.resolve(c.name)).collect();
        assert_eq!(names, vec!["Good"]);
        assert!(matches!(file.chips[0], ChipItem::Error(_)));
    }

    #[test]
    fn stray_tokens_at_top_level() {
        let (file, _, sink) = parse("garbage ; CHIP Ok { }");
        assert_eq!(sink.error_count(), 1);
        assert_eq!(file.chip_defs().count(), 1);
    }

    #[test]
    fn expected_message_names_tokens() {
        let (_, _, sink) = parse("CHIP X { IN a b; }");
        let msgs: Vec<_> = sink.take_all().into_iter().map(|d| d.message).collect();
        assert_eq!(msgs, vec!["expected `;`, found identifier"]);
    }

    #[test]
    fn huge_width_is_reported() {
        let (_, _, sink) = parse("CHIP X { IN a[99999999999]; }");
        assert!(sink.has_errors());
    }

    #[test]
    fn empty_argument_list() {
        let (file, _, sink) = parse("CHIP X { PARTS: Nothing(); }");
        assert!(!sink.has_errors());
        assert!(file.chip_defs().next().unwrap().parts[0].bindings.is_empty());
    }
}
