//! Lexical analyzer for chip definition source text.
//!
//! Converts source text into [`Token`]s, skipping whitespace, `//` line
//! comments and `/* */` block comments. Errors are reported to the
//! [`DiagnosticSink`] and produce [`HdlToken::Error`] tokens.

use crate::token::{lookup_keyword, HdlToken, Token};
use gatesim_diagnostics::code::{Category, DiagnosticCode};
use gatesim_diagnostics::{Diagnostic, DiagnosticSink};
use gatesim_source::{FileId, Span};

/// Lexical error.
pub const E100: DiagnosticCode = DiagnosticCode::new(Category::Error, 100);

/// Lexes the given source text into a vector of tokens.
///
/// The returned vector always ends with an [`HdlToken::Eof`] token.
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl<'a> Lexer<'a> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: HdlToken::Eof,
                    span: self.span_from(self.pos),
                });
                return tokens;
            }
            tokens.push(self.next_token());
        }
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(E100, msg, span));
    }

    fn skip_trivia(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.peek() == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            return;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) {
            while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
                self.pos += 1;
            }
            // Identifiers are ASCII by construction, so this slice is valid UTF-8.
            let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or_default();
            let kind = lookup_keyword(text).unwrap_or(HdlToken::Identifier);
            return Token {
                kind,
                span: self.span_from(start),
            };
        }

        if b.is_ascii_digit() {
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
            return Token {
                kind: HdlToken::Number,
                span: self.span_from(start),
            };
        }

        self.pos += 1;
        let kind = match b {
            b'{' => HdlToken::LeftBrace,
            b'}' => HdlToken::RightBrace,
            b'(' => HdlToken::LeftParen,
            b')' => HdlToken::RightParen,
            b'[' => HdlToken::LeftBracket,
            b']' => HdlToken::RightBracket,
            b',' => HdlToken::Comma,
            b';' => HdlToken::Semicolon,
            b':' => HdlToken::Colon,
            b'=' => HdlToken::Equals,
            b'.' if self.peek() == b'.' => {
                self.pos += 1;
                HdlToken::DotDot
            }
            _ => {
                // Swallow the rest of a multi-byte character so spans stay on char boundaries.
                while self.pos < self.source.len() && (self.source[self.pos] & 0xC0) == 0x80 {
                    self.pos += 1;
                }
                self.error("unexpected character", self.span_from(start));
                HdlToken::Error
            }
        };
        Token {
            kind,
            span: self.span_from(start),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
