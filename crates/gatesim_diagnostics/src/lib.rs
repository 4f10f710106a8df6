//! Structured diagnostics for parsing and linking chip definitions.
//!
//! Structural problems in HDL sources (syntax errors, unknown chips, unknown
//! pins, width mismatches) are never raised as Rust errors. They are emitted
//! as [`Diagnostic`]s into a [`DiagnosticSink`], which counts errors so that
//! callers can tell "something failed" apart from informational output, and
//! which can forward every message to a callback as it arrives.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
