//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use crate::severity::Severity;
use gatesim_source::{SourceDb, Span};
use std::fmt::Write;

/// Formats diagnostics into strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-like layout:
///
/// ```text
/// error[E204]: chip `And` has no pin `c`
///   --> Mux.hdl:6:9
///    |
///  6 |     And(c=sel, b=a, out=x);
///    |         ^ unknown pin
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to wrap the severity header in ANSI color codes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let tag = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return tag;
        }
        let ansi = match diag.severity {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Note => "36",
        };
        format!("\x1b[1;{ansi}m{tag}\x1b[0m")
    }

    fn snippet(&self, out: &mut String, span: Span, marker: char, message: &str, db: &SourceDb) {
        let file = db.get_file(span.file);
        let (line, col) = file.line_col(span.start);
        let line_num = line.to_string();
        let padding = " ".repeat(line_num.len());
        let underline = marker.to_string().repeat(span.len().max(1) as usize);
        let indent = " ".repeat(col.saturating_sub(1) as usize);
        let message = if message.is_empty() {
            String::new()
        } else {
            format!(" {message}")
        };
        let _ = writeln!(out, "{padding} |");
        let _ = writeln!(out, "{line_num} | {}", file.line_text(span.start));
        let _ = writeln!(out, "{padding} | {indent}{underline}{message}");
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.header(diag), diag.message);

        if !diag.primary_span.is_dummy() {
            let resolved = source_db.resolve_span(diag.primary_span);
            let _ = writeln!(out, "  --> {resolved}");
            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| l.message.as_str())
                .unwrap_or_default();
            self.snippet(&mut out, diag.primary_span, '^', primary_msg, source_db);
        }

        for label in &diag.labels {
            if label.style == LabelStyle::Secondary && !label.span.is_dummy() {
                let _ = writeln!(out, "  ::: {}", source_db.resolve_span(label.span));
                self.snippet(&mut out, label.span, '-', &label.message, source_db);
            }
        }

        for note in &diag.notes {
            let _ = writeln!(out, "   = note: {note}");
        }
        for help in &diag.help {
            let _ = writeln!(out, "   = help: {help}");
        }
        out
    }
}
