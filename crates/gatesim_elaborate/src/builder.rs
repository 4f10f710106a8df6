//! Turns parsed chips into [`ChipDecl`] builders.
//!
//! [`DeclBuilder`] is the elaborator's side of the parser's [`Visitor`]
//! contract. It declares pins in source order (inputs, then outputs) and
//! records each part's connections exactly as written; nothing is resolved
//! here.

use gatesim_common::Interner;
use gatesim_diagnostics::DiagnosticSink;
use gatesim_ir::{BitRange, ChipDecl, Connection, Jam, PartId, PinKind};
use gatesim_parser::ast::{Binding, Chip, Direction, NameRef, PartInstance, PinDecl};
use gatesim_parser::{walk_file, HdlFile, Visitor};

use crate::errors;

/// Collects one [`ChipDecl`] per parsed chip.
pub struct DeclBuilder<'a> {
    interner: &'a Interner,
    sink: &'a DiagnosticSink,
    current: Option<ChipDecl>,
    current_part: Option<PartId>,
    finished: Vec<ChipDecl>,
}

impl<'a> DeclBuilder<'a> {
    /// Creates a builder reporting pin declaration errors to `sink`.
    pub fn new(interner: &'a Interner, sink: &'a DiagnosticSink) -> Self {
        Self {
            interner,
            sink,
            current: None,
            current_part: None,
            finished: Vec::new(),
        }
    }

    /// Builds every chip of a parsed file.
    pub fn build(interner: &'a Interner, sink: &'a DiagnosticSink, file: &HdlFile) -> Vec<ChipDecl> {
        let mut builder = Self::new(interner, sink);
        walk_file(&mut builder, file);
        builder.finish()
    }

    /// Returns the chips built so far.
    pub fn finish(self) -> Vec<ChipDecl> {
        self.finished
    }

    fn jam(&self, name: &NameRef) -> Jam {
        Jam {
            name: name.name,
            key: self.interner.fold_ident(name.name),
            range: name.range.map(|r| BitRange::new(r.first, r.last)),
            span: name.span,
        }
    }
}

impl Visitor for DeclBuilder<'_> {
    fn visit_chip(&mut self, chip: &Chip) {
        let key = self.interner.fold_ident(chip.name);
        self.current = Some(ChipDecl::new(chip.name, key, chip.name_span));
        self.current_part = None;
    }

    fn visit_pin(&mut self, pin: &PinDecl, direction: Direction) {
        let Some(decl) = self.current.as_mut() else {
            return;
        };
        let kind = match direction {
            Direction::In => PinKind::Input,
            Direction::Out => PinKind::Output,
        };
        let key = self.interner.fold_ident(pin.name);
        if let Err(err) = decl.add_pin(pin.name, key, pin.bit_width(), kind, pin.span) {
            self.sink.emit(errors::error_add_pin(
                err,
                self.interner.resolve(decl.name),
                self.interner.resolve(pin.name),
                pin.span,
            ));
        }
    }

    fn visit_part(&mut self, part: &PartInstance) {
        let key = self.interner.fold_ident(part.chip);
        self.current_part = self
            .current
            .as_mut()
            .map(|decl| decl.add_part(part.chip, key, part.span));
    }

    fn visit_binding(&mut self, _part: &PartInstance, binding: &Binding) {
        let connection = Connection {
            jam: self.jam(&binding.jam),
            pin: self.jam(&binding.pin),
            span: binding.span,
        };
        if let (Some(decl), Some(part)) = (self.current.as_mut(), self.current_part) {
            decl.parts[part].connections.push(connection);
        }
    }

    fn leave_chip(&mut self, _chip: &Chip) {
        if let Some(decl) = self.current.take() {
            self.finished.push(decl);
        }
        self.current_part = None;
    }
}
