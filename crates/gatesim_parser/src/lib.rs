//! Hand-written lexer and recursive descent parser for `.hdl` chip files.
//!
//! ```text
//! CHIP AndOr3 {
//!     IN a, b, c;
//!     OUT out;
//!     PARTS:
//!     And(a=a, b=b, out=ab);
//!     Or(a=ab, b=c, out=out);
//! }
//! ```
//!
//! - **Lexer** ([`lexer`]): source text to tokens; case-sensitive keywords,
//!   `//` and `/* */` comments.
//! - **Parser** ([`parser`]): recursive descent with resynchronization at `;`,
//!   `}` and `CHIP`, so one file reports all of its syntax errors.
//! - **AST** ([`ast`]): spanned nodes.
//! - **Visitor** ([`visit`]): the structural walk consumed by the elaborator.

#![warn(missing_docs)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod visit;

pub use ast::HdlFile;
pub use token::{HdlToken, Token};
pub use visit::{walk_chip, walk_file, Visitor};

use gatesim_common::Interner;
use gatesim_diagnostics::DiagnosticSink;
use gatesim_source::{FileId, SourceDb};

/// Parses a file held in the source database.
///
/// Syntax errors are reported to `sink`; whatever could be parsed is returned.
pub fn parse_file(
    file_id: FileId,
    source_db: &SourceDb,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> HdlFile {
    let source = &source_db.get_file(file_id).content;
    let tokens = lexer::lex(source, file_id, sink);
    parser::HdlParser::new(tokens, source, interner, sink).parse_file()
}

/// Parses text that is not registered in a [`SourceDb`].
///
/// Spans point at [`FileId::DUMMY`], so diagnostics carry no location.
pub fn parse_str(source: &str, interner: &Interner, sink: &DiagnosticSink) -> HdlFile {
    let tokens = lexer::lex(source, FileId::DUMMY, sink);
    parser::HdlParser::new(tokens, source, interner, sink).parse_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_source(source: &str) -> (HdlFile, Interner, DiagnosticSink) {
        let mut db = SourceDb::new();
        let file_id = db.add_source("test.hdl", source.to_string());
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let ast = parse_file(file_id, &db, &interner, &sink);
        (ast, interner, sink)
    }

    #[test]
    fn integration_and_or3() {
        let (ast, interner, sink) = parse_source(
            "// a two-level gate network
            CHIP AndOr3 {
                IN a, b, c;
                OUT out;
                PARTS:
                And(a=a, b=b, out=ab);
                Or(a=ab, b=c, out=out);
            }",
        );
        assert!(!sink.has_errors());
        let chip = ast.chip_defs().next().unwrap();
        assert_eq!(interner.resolve(chip.name), "AndOr3");
        assert_eq!(chip.parts.len(), 2);
        assert_eq!(interner.resolve(chip.parts[1].bindings[0].pin.name), "ab");
    }

    #[test]
    fn integration_multi_chip_file() {
        let (ast, _, sink) = parse_source(
            "CHIP Buf { IN in; OUT out; PARTS: Not(in=in, out=n); Not(in=n, out=out); }
             CHIP Inv { IN in; OUT out; PARTS: Not(in=in, out=out); }",
        );
        assert!(!sink.has_errors());
        assert_eq!(ast.chips.len(), 2);
    }

    #[test]
    fn integration_error_spans_point_into_file() {
        let (_, _, sink) = parse_source("CHIP X {\n  IN a\n}");
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].primary_span.is_dummy());
    }

    #[test]
    fn integration_serde_roundtrip() {
        let (ast, _, _) = parse_source("CHIP T { IN a; OUT b; }");
        let json = serde_json::to_string(&ast).unwrap();
        let back: HdlFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chips.len(), ast.chips.len());
    }

    #[test]
    fn parse_str_has_dummy_spans() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let ast = parse_str("CHIP T { }", &interner, &sink);
        assert!(ast.span.is_dummy());
    }
}
