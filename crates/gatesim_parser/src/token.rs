//! Token types for the chip definition lexer.

use gatesim_source::Span;
use serde::{Deserialize, Serialize};

/// A token kind.
///
/// Identifier and number text is not stored in the token; the parser slices
/// it from the source using the token's span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum HdlToken {
    /// `CHIP`
    Chip,
    /// `IN`
    In,
    /// `OUT`
    Out,
    /// `PARTS`
    Parts,
    /// A name such as `And16` or `sel`.
    Identifier,
    /// A decimal number.
    Number,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `=`
    Equals,
    /// `..`
    DotDot,
    /// A character the lexer could not classify.
    Error,
    /// End of input.
    Eof,
}

impl HdlToken {
    /// Returns `true` for the reserved words of the chip grammar.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            HdlToken::Chip | HdlToken::In | HdlToken::Out | HdlToken::Parts
        )
    }

    /// Human-readable description used in "expected X, found Y" messages.
    pub fn describe(self) -> &'static str {
        match self {
            HdlToken::Chip => "`CHIP`",
            HdlToken::In => "`IN`",
            HdlToken::Out => "`OUT`",
            HdlToken::Parts => "`PARTS`",
            HdlToken::Identifier => "identifier",
            HdlToken::Number => "number",
            HdlToken::LeftBrace => "`{`",
            HdlToken::RightBrace => "`}`",
            HdlToken::LeftParen => "`(`",
            HdlToken::RightParen => "`)`",
            HdlToken::LeftBracket => "`[`",
            HdlToken::RightBracket => "`]`",
            HdlToken::Comma => "`,`",
            HdlToken::Semicolon => "`;`",
            HdlToken::Colon => "`:`",
            HdlToken::Equals => "`=`",
            HdlToken::DotDot => "`..`",
            HdlToken::Error => "invalid character",
            HdlToken::Eof => "end of file",
        }
    }
}

/// A lexed token with its kind and source location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The kind of this token.
    pub kind: HdlToken,
    /// The source span covering this token's text.
    pub span: Span,
}

/// Looks up a keyword. Keywords are case-sensitive: `chip` is an identifier.
pub fn lookup_keyword(s: &str) -> Option<HdlToken> {
    match s {
        "CHIP" => Some(HdlToken::Chip),
        "IN" => Some(HdlToken::In),
        "OUT" => Some(HdlToken::Out),
        "PARTS" => Some(HdlToken::Parts),
        _ => None,
    }
}
