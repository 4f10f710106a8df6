//! Source text management for `.hdl` chip files.
//!
//! The [`SourceDb`] owns every file read during a session, whether loaded
//! from a chip library folder or supplied in memory, and resolves [`Span`]s
//! to line/column coordinates for diagnostics.

#![warn(missing_docs)]

pub mod source_db;
pub mod span;

pub use source_db::{chip_file_name, ResolvedSpan, SourceDb, SourceFile, HDL_EXTENSION};
pub use span::{FileId, Span};
