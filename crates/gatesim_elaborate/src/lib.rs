//! Chip resolution and linking.
//!
//! A [`Context`] maps chip names to definitions, loading `<name>.hdl` from a
//! library folder on first use and falling back to the built-in gates.
//! [`Context::link`] validates a chip's parts and connections, and
//! [`Context::freeze`] turns a linked chip into an immutable
//! [`Netlist`](gatesim_ir::Netlist) for simulation.
//!
//! # Usage
//!
//! ```ignore
//! let mut ctx = Context::with_library("hdl");
//! let netlist = ctx.elaborate("AndOr3")?;
//! ```
//!
//! Problems in HDL sources are reported to the context's diagnostic sink;
//! only internal bugs produce an `Err`.

#![warn(missing_docs)]

pub mod builder;
pub mod context;
pub mod errors;
pub mod link;

pub use builder::DeclBuilder;
pub use context::{Context, LinkStatus};

#[cfg(test)]
mod tests {
    use super::*;
    use gatesim_ir::PinKind;
    use std::fs;

    #[test]
    fn loads_chips_from_library_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Buf.hdl"),
            "CHIP Buf { IN in; OUT out; PARTS: Not(in=in, out=n); Not(in=n, out=out); }",
        )
        .unwrap();
        fs::write(
            dir.path().join("Top.hdl"),
            "CHIP Top { IN a; OUT b; PARTS: Buf(in=a, out=b); }",
        )
        .unwrap();
        let mut ctx = Context::with_library(dir.path());
        let top = ctx.chip("Top").unwrap();
        assert!(ctx.link(top));
        assert!(ctx.lookup("buf").is_some());
        let netlist = ctx.freeze(top).unwrap().unwrap();
        assert_eq!(netlist.len(), 3);
    }

    #[test]
    fn library_file_must_declare_requested_chip() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Half.hdl"), "CHIP Full { }").unwrap();
        let mut ctx = Context::with_library(dir.path());
        assert!(ctx.chip("Half").is_none());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.sink().diagnostics()[0].code, errors::E201);
        // the other chip in the file was still registered
        assert!(ctx.lookup("Full").is_some());
    }

    #[test]
    fn library_file_shadows_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Not.hdl"),
            "CHIP Not { IN in; OUT out; PARTS: Nand(a=in, b=in, out=out); }",
        )
        .unwrap();
        let mut ctx = Context::with_library(dir.path());
        let not = ctx.chip("Not").unwrap();
        assert!(ctx.decl(not).unwrap().gate.is_none());
        assert!(ctx.link(not));
        assert_eq!(ctx.decl(not).unwrap().pins_of(PinKind::Input).count(), 1);
        let notes: Vec<_> = ctx.sink().diagnostics();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].code, errors::N200);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn failed_lookup_does_not_block_other_spelling() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("FullAdder.hdl"),
            "CHIP FullAdder { IN a; OUT out; PARTS: Not(in=a, out=out); }",
        )
        .unwrap();
        let mut ctx = Context::with_library(dir.path());
        // `fulladder.hdl` only exists on case-insensitive file systems
        let _ = ctx.chip("fulladder");
        assert!(ctx.chip("FullAdder").is_some());
    }

    #[test]
    fn broken_library_file_is_read_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Bad.hdl"), "CHIP Bad { IN a OUT b; }").unwrap();
        let mut ctx = Context::with_library(dir.path());
        assert!(ctx.chip("Bad").is_none());
        let errors = ctx.error_count();
        assert!(errors > 0);
        assert!(ctx.chip("Bad").is_none());
        assert_eq!(ctx.error_count(), errors);
        assert_eq!(ctx.source_db().len(), 1);
    }

    #[test]
    fn load_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = Context::new();
        assert!(ctx.load_file(&dir.path().join("nope.hdl")).is_empty());
        assert_eq!(ctx.sink().diagnostics()[0].code, errors::E211);
    }
}
