//! Canonical HDL text for chips.
//!
//! The output is accepted by the parser again. Synthesized internal nets are
//! not declared; they reappear from the part connections that name them.

use crate::arena::Arena;
use crate::chip::ChipDecl;
use crate::ids::{ChipId, PinId};
use crate::netlist::{ChipKind, Netlist};
use crate::pin::{BitRange, Pin, PinKind};
use gatesim_common::{Ident, Interner};
use std::fmt::Write;

const INDENT: &str = "    ";

fn write_pins<'a>(
    out: &mut String,
    keyword: &str,
    pins: impl Iterator<Item = &'a Pin>,
    interner: &Interner,
) {
    let decls: Vec<String> = pins
        .map(|pin| {
            let name = interner.resolve(pin.name);
            if pin.width == 1 {
                name.to_string()
            } else {
                format!("{name}[{}]", pin.width)
            }
        })
        .collect();
    if !decls.is_empty() {
        let _ = writeln!(out, "{INDENT}{keyword} {};", decls.join(", "));
    }
}

fn name_ref(name: Ident, range: Option<BitRange>, interner: &Interner) -> String {
    match range {
        Some(range) => format!("{}{range}", interner.resolve(name)),
        None => interner.resolve(name).to_string(),
    }
}

fn write_chip(
    out: &mut String,
    name: Ident,
    gate: bool,
    pins: &Arena<PinId, Pin>,
    parts: Vec<(Ident, Vec<String>)>,
    interner: &Interner,
) {
    if gate {
        out.push_str("// built-in\n");
    }
    let _ = writeln!(out, "CHIP {} {{", interner.resolve(name));
    write_pins(out, "IN", pins.values().filter(|p| p.kind == PinKind::Input), interner);
    write_pins(out, "OUT", pins.values().filter(|p| p.kind == PinKind::Output), interner);
    let _ = writeln!(out, "{INDENT}PARTS:");
    for (chip, connections) in parts {
        let _ = writeln!(
            out,
            "{INDENT}{}({});",
            interner.resolve(chip),
            connections.join(", ")
        );
    }
    out.push_str("}\n");
}

impl ChipDecl {
    /// Renders the chip as written, with connections in source order.
    pub fn render(&self, interner: &Interner) -> String {
        let parts = self
            .parts
            .values()
            .map(|part| {
                let connections = part
                    .connections
                    .iter()
                    .map(|c| {
                        format!(
                            "{}={}",
                            name_ref(c.jam.name, c.jam.range, interner),
                            name_ref(c.pin.name, c.pin.range, interner)
                        )
                    })
                    .collect();
                (part.chip, connections)
            })
            .collect();
        let mut out = String::new();
        write_chip(&mut out, self.name, self.is_gate(), &self.pins, parts, interner);
        out
    }
}

impl Netlist {
    /// Renders a linked chip from its wires. Returns `None` for an unknown ID.
    pub fn render(&self, id: ChipId, interner: &Interner) -> Option<String> {
        let chip = self.chip(id)?;
        let mut parts = Vec::with_capacity(chip.parts.len());
        for part in chip.parts.values() {
            let child = self.chip(part.chip)?;
            let mut connections = Vec::with_capacity(part.wires.len());
            for wire in &part.wires {
                let child_pin = child.pin(wire.child)?;
                let parent_pin = chip.pin(wire.parent)?;
                connections.push(format!(
                    "{}={}",
                    name_ref(child_pin.name, wire.child_range, interner),
                    name_ref(parent_pin.name, wire.parent_range, interner)
                ));
            }
            parts.push((part.name, connections));
        }
        let mut out = String::new();
        let gate = matches!(chip.kind, ChipKind::Gate(_));
        write_chip(&mut out, chip.name, gate, &chip.pins, parts, interner);
        Some(out)
    }
}
