//! Structural visitor over a parsed [`HdlFile`].
//!
//! This is the only contract between the grammar and the chip model: a
//! consumer implements [`Visitor`] and receives each chip, pin, part and
//! binding in source order. All methods default to doing nothing.

use crate::ast::{Binding, Chip, Direction, HdlFile, PartInstance, PinDecl};

/// Callbacks fired by [`walk_file`] and [`walk_chip`].
pub trait Visitor {
    /// Called when a chip definition starts.
    fn visit_chip(&mut self, _chip: &Chip) {}

    /// Called for every `IN` and `OUT` declaration, inputs first.
    fn visit_pin(&mut self, _pin: &PinDecl, _direction: Direction) {}

    /// Called for every part instantiation, before its bindings.
    fn visit_part(&mut self, _part: &PartInstance) {}

    /// Called for every `jam = pin` binding of the current part.
    fn visit_binding(&mut self, _part: &PartInstance, _binding: &Binding) {}

    /// Called when a chip definition ends.
    fn leave_chip(&mut self, _chip: &Chip) {}
}

/// Visits every successfully parsed chip in `file`.
pub fn walk_file<V: Visitor + ?Sized>(visitor: &mut V, file: &HdlFile) {
    for chip in file.chip_defs() {
        walk_chip(visitor, chip);
    }
}

/// Visits one chip: its pins, then its parts with their bindings.
pub fn walk_chip<V: Visitor + ?Sized>(visitor: &mut V, chip: &Chip) {
    visitor.visit_chip(chip);
    for pin in &chip.inputs {
        visitor.visit_pin(pin, Direction::In);
    }
    for pin in &chip.outputs {
        visitor.visit_pin(pin, Direction::Out);
    }
    for part in &chip.parts {
        visitor.visit_part(part);
        for binding in &part.bindings {
            visitor.visit_binding(part, binding);
        }
    }
    visitor.leave_chip(chip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;
    use gatesim_common::Interner;
    use gatesim_diagnostics::DiagnosticSink;

    #[derive(Default)]
    struct Trace<'a> {
        interner: Option<&'a Interner>,
        events: Vec<String>,
    }

    impl Visitor for Trace<'_> {
        fn visit_chip(&mut self, chip: &Chip) {
            let name = self.interner.unwrap().resolve(chip.name).to_string();
            self.events.push(format!("chip {name}"));
        }
        fn visit_pin(&mut self, pin: &PinDecl, direction: Direction) {
            let name = self.interner.unwrap().resolve(pin.name).to_string();
            self.events.push(format!("pin {direction:?} {name}"));
        }
        fn visit_part(&mut self, part: &PartInstance) {
            let name = self.interner.unwrap().resolve(part.chip).to_string();
            self.events.push(format!("part {name}"));
        }
        fn visit_binding(&mut self, _part: &PartInstance, binding: &Binding) {
            let i = self.interner.unwrap();
            self.events.push(format!(
                "bind {}={}",
                i.resolve(binding.jam.name),
                i.resolve(binding.pin.name)
            ));
        }
        fn leave_chip(&mut self, _chip: &Chip) {
            self.events.push("end".to_string());
        }
    }

    #[test]
    fn visits_in_source_order() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let file = parse_str(
            "CHIP Or8 { OUT out; IN a, b; PARTS: Or(a=a, b=b, out=out); }",
            &interner,
            &sink,
        );
        let mut trace = Trace {
            interner: Some(&interner),
            ..Default::default()
        };
        walk_file(&mut trace, &file);
        assert_eq!(
            trace.events,
            vec![
                "chip Or8",
                "pin In a",
                "pin In b",
                "pin Out out",
                "part Or",
                "bind a=a",
                "bind b=b",
                "bind out=out",
                "end",
            ]
        );
    }

    #[test]
    fn default_methods_do_nothing() {
        struct Silent;
        impl Visitor for Silent {}
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let file = parse_str("CHIP A { } CHIP B { }", &interner, &sink);
        walk_file(&mut Silent, &file);
        assert_eq!(file.chip_defs().count(), 2);
    }
}
