//! Linking: resolving parts and connections into wires.
//!
//! Linking a chip resolves each part's chip by name, links it, and turns
//! every `jam = pin` connection into a [`Wire`]. The jam side names a pin of
//! the instantiated chip. The pin side names a pin of the enclosing chip;
//! an undeclared name there becomes a new internal net of the enclosing
//! chip. Every part is checked even after one fails, so a single pass
//! reports every problem.

use gatesim_common::{GatesimResult, Ident, InternalError};
use gatesim_ir::{
    Arena, Chip, ChipId, ChipKind, Connection, Netlist, Part, PartId, Pin, PinKind,
    Wire, WireDirection,
};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::context::{Context, LinkStatus};
use crate::errors;

impl Context {
    /// Links a chip and, recursively, every chip it instantiates.
    ///
    /// The result is memoized: later calls return it without revisiting any
    /// part or repeating diagnostics. Returns `false` for an unknown ID.
    pub fn link(&mut self, id: ChipId) -> bool {
        let Some(status) = self.status.get(id.as_raw() as usize).copied() else {
            return false;
        };
        match status {
            LinkStatus::Linked(ok) => return ok,
            LinkStatus::InProgress => return false,
            LinkStatus::Unlinked => {}
        }
        if self.chips[id].is_gate() {
            self.set_status(id, LinkStatus::Linked(true));
            return true;
        }

        self.set_status(id, LinkStatus::InProgress);
        let mut ok = true;
        for index in 0..self.chips[id].parts.len() {
            ok &= self.link_part(id, PartId::from_raw(index as u32));
        }
        if ok {
            self.check_drivers(id);
        }
        debug!(chip = self.chip_name(id), ok, "linked");
        self.set_status(id, LinkStatus::Linked(ok));
        ok
    }

    /// The memoized link result, or `None` if the chip has not been linked.
    pub fn link_result(&self, id: ChipId) -> Option<bool> {
        match self.status.get(id.as_raw() as usize)? {
            LinkStatus::Linked(ok) => Some(*ok),
            _ => None,
        }
    }

    fn set_status(&mut self, id: ChipId, status: LinkStatus) {
        if let Some(slot) = self.status.get_mut(id.as_raw() as usize) {
            *slot = status;
        }
    }

    fn link_part(&mut self, parent: ChipId, part: PartId) -> bool {
        let (chip_name, span, connections) = {
            let decl = &self.chips[parent].parts[part];
            (decl.chip, decl.span, decl.connections.clone())
        };
        let name = self.interner.resolve(chip_name).to_string();
        let Some(child) = self.resolve(&name, span) else {
            return false;
        };

        let mut ok = match self.status[child.as_raw() as usize] {
            LinkStatus::InProgress => {
                self.sink
                    .emit(errors::error_circular_instantiation(&name, span));
                false
            }
            _ => self.link(child),
        };

        let mut wires = Vec::with_capacity(connections.len());
        for connection in &connections {
            match self.link_connection(parent, child, connection) {
                Some(wire) => wires.push(wire),
                None => ok = false,
            }
        }
        if ok {
            self.check_unconnected(child, &wires, span);
        }

        let decl = &mut self.chips[parent].parts[part];
        decl.resolved = Some(child);
        decl.wires = wires;
        ok
    }

    fn link_connection(&mut self, parent: ChipId, child: ChipId, connection: &Connection) -> Option<Wire> {
        let child_pin = self.link_jam(child, connection)?;
        let jam_width = connection.jam.width_on(child_pin.width);
        let parent_pin = self.link_pin(parent, connection, jam_width)?;
        let pin_width = connection.pin.width_on(parent_pin.width);

        if jam_width != pin_width {
            let jam_text = self.ref_text(&connection.jam);
            let pin_text = self.ref_text(&connection.pin);
            self.sink.emit(errors::error_width_mismatch(
                &jam_text,
                jam_width,
                &pin_text,
                pin_width,
                connection.span,
            ));
            return None;
        }

        let direction = match child_pin.kind {
            PinKind::Input => WireDirection::Drive,
            _ => WireDirection::Sense,
        };
        if direction == WireDirection::Sense && parent_pin.kind == PinKind::Input {
            self.sink.emit(errors::error_drives_input(
                self.interner.resolve(child_pin.name),
                self.interner.resolve(parent_pin.name),
                connection.span,
            ));
            return None;
        }

        trace!(
            child = self.interner.resolve(child_pin.name),
            parent = self.interner.resolve(parent_pin.name),
            ?direction,
            "wire"
        );
        Some(Wire {
            child: child_pin.index,
            child_range: connection.jam.range,
            parent: parent_pin.index,
            parent_range: connection.pin.range,
            direction,
        })
    }

    /// Resolves the jam side against the instantiated chip's terminals.
    fn link_jam(&self, child: ChipId, connection: &Connection) -> Option<Pin> {
        let jam = &connection.jam;
        let decl = &self.chips[child];
        let chip_name = self.interner.resolve(decl.name);
        let jam_name = self.interner.resolve(jam.name);
        let Some(pin) = decl.pin_by_key(jam.key) else {
            self.sink
                .emit(errors::error_unknown_pin(jam_name, chip_name, jam.span));
            return None;
        };
        if !pin.is_terminal() {
            self.sink
                .emit(errors::error_internal_pin(jam_name, chip_name, jam.span));
            return None;
        }
        if let Some(range) = jam.range {
            if !range.fits(pin.width) {
                self.sink
                    .emit(errors::error_bad_range(jam_name, range, pin.width, jam.span));
                return None;
            }
        }
        Some(pin.clone())
    }

    /// Resolves the pin side against the enclosing chip, synthesizing an
    /// internal net for an undeclared name.
    fn link_pin(&mut self, parent: ChipId, connection: &Connection, jam_width: u32) -> Option<Pin> {
        let jam = &connection.pin;
        let name = self.interner.resolve(jam.name);
        if let Some(pin) = self.chips[parent].pin_by_key(jam.key) {
            if let Some(range) = jam.range {
                if !range.fits(pin.width) {
                    self.sink
                        .emit(errors::error_bad_range(name, range, pin.width, jam.span));
                    return None;
                }
            }
            return Some(pin.clone());
        }

        let width = match jam.range {
            Some(range) if !range.is_ordered() => {
                self.sink
                    .emit(errors::error_bad_range(name, range, range.last + 1, jam.span));
                return None;
            }
            Some(range) => range.last + 1,
            None => jam_width,
        };
        let width = width.max(self.net_width(parent, jam.key));
        debug!(chip = self.chip_name(parent), net = self.interner.resolve(jam.name), width, "synthesized internal net");
        let id = self.add_pin_ident(parent, jam.name, width, PinKind::Internal, jam.span)?;
        self.chips[parent].pins.get(id).cloned()
    }

    /// The width an undeclared net needs to hold every reference to it in
    /// `parent`: the highest ranged bit plus one, or the full width of a
    /// child pin it is bound to whole. Zero when nothing constrains it.
    fn net_width(&mut self, parent: ChipId, key: Ident) -> u32 {
        let references: Vec<_> = self.chips[parent]
            .parts
            .values()
            .flat_map(|part| {
                part.connections
                    .iter()
                    .filter(|c| c.pin.key == key)
                    .map(|c| (part.chip, part.span, c.jam.clone(), c.pin.range))
            })
            .collect();

        let mut width = 0;
        for (chip, span, child_jam, range) in references {
            let needed = match range {
                Some(range) if range.is_ordered() => range.last + 1,
                Some(_) => continue,
                None => {
                    let name = self.interner.resolve(chip).to_string();
                    let Some(child) = self.resolve(&name, span) else {
                        continue;
                    };
                    match self.chips[child].pin_by_key(child_jam.key) {
                        Some(pin) if child_jam.range.map_or(true, |r| r.fits(pin.width)) => {
                            child_jam.width_on(pin.width)
                        }
                        _ => continue,
                    }
                }
            };
            width = width.max(needed);
        }
        width
    }

    fn ref_text(&self, jam: &gatesim_ir::Jam) -> String {
        let name = self.interner.resolve(jam.name);
        match jam.range {
            Some(range) => format!("{name}{range}"),
            None => name.to_string(),
        }
    }

    fn check_unconnected(&self, child: ChipId, wires: &[Wire], span: gatesim_source::Span) {
        let decl = &self.chips[child];
        for pin in decl.pins_of(PinKind::Input) {
            if !wires.iter().any(|w| w.child == pin.index) {
                self.sink.emit(errors::warn_unconnected_input(
                    self.interner.resolve(pin.name),
                    self.interner.resolve(decl.name),
                    span,
                ));
            }
        }
    }

    fn check_drivers(&self, id: ChipId) {
        let decl = &self.chips[id];
        let driven = |pin: &Pin| {
            decl.parts.values().any(|part| {
                part.wires
                    .iter()
                    .any(|w| w.direction == WireDirection::Sense && w.parent == pin.index)
            })
        };
        for pin in decl.pins.values() {
            if pin.kind != PinKind::Input && !driven(pin) {
                self.sink.emit(errors::warn_undriven(
                    self.interner.resolve(pin.name),
                    pin.kind,
                    self.interner.resolve(decl.name),
                    pin.span,
                ));
            }
        }
    }

    /// Links `top` and copies every chip reachable from it into a [`Netlist`].
    ///
    /// Returns `Ok(None)` when linking fails or the context holds any error.
    pub fn freeze(&mut self, top: ChipId) -> GatesimResult<Option<Netlist>> {
        if !self.link(top) || self.has_errors() {
            return Ok(None);
        }

        let mut remap: HashMap<ChipId, ChipId> = HashMap::new();
        let mut order = vec![top];
        remap.insert(top, ChipId::from_raw(0));
        let mut next = 0;
        while next < order.len() {
            let decl = &self.chips[order[next]];
            for part in decl.parts.values() {
                let child = part.resolved.ok_or_else(|| {
                    InternalError::new(format!(
                        "part {} of linked chip `{}` is unresolved",
                        part.index,
                        self.interner.resolve(decl.name)
                    ))
                })?;
                if !remap.contains_key(&child) {
                    remap.insert(child, ChipId::from_raw(order.len() as u32));
                    order.push(child);
                }
            }
            next += 1;
        }

        let mut chips: Arena<ChipId, Chip> = Arena::new();
        for old in &order {
            let decl = &self.chips[*old];
            let mut parts: Arena<PartId, Part> = Arena::new();
            for part in decl.parts.values() {
                let chip = part
                    .resolved
                    .and_then(|c| remap.get(&c).copied())
                    .ok_or_else(|| InternalError::new("part chip missing from netlist"))?;
                parts.alloc(Part {
                    index: part.index,
                    chip,
                    name: part.chip,
                    wires: part.wires.clone(),
                    span: part.span,
                });
            }
            let kind = match decl.gate {
                Some(gate) => ChipKind::Gate(gate),
                None => ChipKind::Composite,
            };
            chips.alloc(Chip::new(decl.name, kind, decl.pins.clone(), parts));
        }
        debug!(top = self.chip_name(top), chips = chips.len(), "frozen netlist");
        Ok(Some(Netlist::new(chips, ChipId::from_raw(0))))
    }

    /// Resolves `name`, links it and freezes the result.
    pub fn elaborate(&mut self, name: &str) -> GatesimResult<Option<Netlist>> {
        match self.chip(name) {
            Some(top) => self.freeze(top),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesim_ir::PinId;

    const AND_OR3: &str = "CHIP AndOr3 {
        IN a, b, c;
        OUT out;
        PARTS:
        And(a=a, b=b, out=ab);
        Or(a=ab, b=c, out=out);
    }";

    fn context(source: &str) -> (Context, ChipId) {
        let mut ctx = Context::new();
        let ids = ctx.add_source("test.hdl", source);
        let top = ids[0];
        (ctx, top)
    }

    #[test]
    fn links_and_synthesizes_parent_net() {
        let (mut ctx, top) = context(AND_OR3);
        assert!(ctx.link(top));
        assert!(!ctx.has_errors());
        let decl = ctx.decl(top).unwrap();
        let ab = decl.pin_by_key(ctx.interner().fold("ab")).unwrap();
        assert_eq!(ab.kind, PinKind::Internal);
        assert_eq!(ab.width, 1);
        assert_eq!(ab.index, PinId::from_raw(4));
        let and = &decl.parts[PartId::from_raw(0)];
        assert!(and.resolved.is_some());
        assert_eq!(and.wires.len(), 3);
        assert_eq!(and.wires[2].direction, WireDirection::Sense);
        assert_eq!(and.wires[0].direction, WireDirection::Drive);
        // the shared gate definition is untouched
        let and_chip = ctx.decl(and.resolved.unwrap()).unwrap();
        assert_eq!(and_chip.pins.len(), 3);
    }

    #[test]
    fn link_is_idempotent() {
        let (mut ctx, top) = context(
            "CHIP T { IN a; OUT out; PARTS: Not(in=a, out=out); Not(x=a, out=y); }",
        );
        assert!(!ctx.link(top));
        let first = ctx.sink().diagnostics().len();
        assert!(first > 0);
        assert!(!ctx.link(top));
        assert_eq!(ctx.sink().diagnostics().len(), first);
        assert_eq!(ctx.link_result(top), Some(false));
    }

    #[test]
    fn every_part_is_checked() {
        let (mut ctx, top) = context(
            "CHIP T { IN a; OUT o1, o2; PARTS:
                Not(in=nope, x=a, out=o1);
                Missing(in=a, out=o2);
                Not(in=a, y=a, out=o2);
            }",
        );
        assert!(!ctx.link(top));
        let codes: Vec<_> = ctx.sink().diagnostics().iter().map(|d| d.code).collect();
        assert!(codes.contains(&errors::E204));
        assert!(codes.contains(&errors::E200));
        assert_eq!(codes.iter().filter(|c| **c == errors::E204).count(), 2);
    }

    #[test]
    fn circular_instantiation_reported_once() {
        let (mut ctx, _) = context(
            "CHIP A { IN x; OUT y; PARTS: B(x=x, y=y); }
             CHIP B { IN x; OUT y; PARTS: A(x=x, y=y); }",
        );
        let a = ctx.chip("A").unwrap();
        assert!(!ctx.link(a));
        let circular = ctx
            .sink()
            .diagnostics()
            .iter()
            .filter(|d| d.code == errors::E207)
            .count();
        assert_eq!(circular, 1);
        assert!(!ctx.link(a));
    }

    #[test]
    fn self_instantiation() {
        let (mut ctx, top) = context("CHIP Loop { IN x; OUT y; PARTS: Loop(x=x, y=y); }");
        assert!(!ctx.link(top));
        assert_eq!(ctx.error_count(), 1);
    }

    #[test]
    fn width_mismatch_and_bad_range() {
        let (mut ctx, top) = context(
            "CHIP T { IN a[4]; OUT out; PARTS:
                Not(in=a, out=out);
                Not(in=a[4], out=n);
                Not(in=a[3..1], out=m);
            }",
        );
        assert!(!ctx.link(top));
        let codes: Vec<_> = ctx.sink().diagnostics().iter().map(|d| d.code).collect();
        assert!(codes.contains(&errors::E205));
        assert_eq!(codes.iter().filter(|c| **c == errors::E209).count(), 2);
    }

    #[test]
    fn output_cannot_drive_input() {
        let (mut ctx, top) = context("CHIP T { IN a; OUT o; PARTS: Not(in=a, out=a); Not(in=a, out=o); }");
        assert!(!ctx.link(top));
        assert!(ctx
            .sink()
            .diagnostics()
            .iter()
            .any(|d| d.code == errors::E210));
    }

    #[test]
    fn internal_pin_of_child_not_connectable() {
        let (mut ctx, _) = context(
            "CHIP Inner { IN a; OUT o; PARTS: Not(in=a, out=t); Not(in=t, out=o); }
             CHIP Outer { IN a; OUT o; PARTS: Inner(a=a, t=o); }",
        );
        let outer = ctx.chip("Outer").unwrap();
        assert!(!ctx.link(outer));
        assert!(ctx
            .sink()
            .diagnostics()
            .iter()
            .any(|d| d.code == errors::E208));
    }

    #[test]
    fn ranged_net_width_is_last_plus_one() {
        let (mut ctx, top) = context(
            "CHIP T { IN a, b; OUT o; PARTS:
                Not(in=b, out=bus[1]);
                Not(in=a, out=bus[0]);
                And(a=bus[0], b=bus[1], out=o);
            }",
        );
        assert!(ctx.link(top));
        let bus = ctx.decl(top).unwrap().pin_by_key(ctx.interner().fold("bus")).unwrap();
        assert_eq!(bus.width, 2);
    }

    #[test]
    fn misspelled_part_does_not_break_other_chips() {
        let (mut ctx, bad) = context(
            "CHIP Bad { IN a; OUT o; PARTS: not(in=a, out=o); }
             CHIP Good { IN a; OUT o; PARTS: Not(in=a, out=o); }",
        );
        assert!(!ctx.link(bad));
        assert_eq!(ctx.error_count(), 1);
        let good = ctx.chip("Good").unwrap();
        assert!(ctx.link(good));
        assert_eq!(ctx.error_count(), 1);
    }

    #[test]
    fn ranged_net_width_ignores_declaration_order() {
        let (mut ctx, top) = context(
            "CHIP T { IN a, b; OUT o; PARTS:
                Not(in=a, out=bus[0]);
                Not(in=b, out=bus[1]);
                And(a=bus[0], b=bus[1], out=o);
            }",
        );
        assert!(ctx.link(top));
        assert!(!ctx.has_errors());
        let bus = ctx.decl(top).unwrap().pin_by_key(ctx.interner().fold("bus")).unwrap();
        assert_eq!(bus.width, 2);
    }

    #[test]
    fn whole_binding_widens_net_declared_later() {
        let (mut ctx, _) = context(
            "CHIP Pair { IN a, b; OUT o[2]; PARTS:
                Not(in=a, out=o[0]);
                Not(in=b, out=o[1]);
            }
            CHIP T { IN a, b; OUT o; PARTS:
                Not(in=w[1], out=o);
                Pair(a=a, b=b, o=w);
            }",
        );
        let t = ctx.chip("T").unwrap();
        assert!(ctx.link(t));
        assert!(!ctx.has_errors());
        let w = ctx.decl(t).unwrap().pin_by_key(ctx.interner().fold("w")).unwrap();
        assert_eq!(w.width, 2);
    }

    #[test]
    fn undriven_output_warns_only() {
        let (mut ctx, top) = context("CHIP T { IN a; OUT o, p; PARTS: Not(in=a, out=o); }");
        assert!(ctx.link(top));
        assert!(!ctx.has_errors());
        assert!(ctx
            .sink()
            .diagnostics()
            .iter()
            .any(|d| d.code == errors::W200 && d.message.contains("`p`")));
    }

    #[test]
    fn unconnected_child_input_warns() {
        let (mut ctx, top) = context("CHIP T { IN a; OUT o; PARTS: And(a=a, out=o); }");
        assert!(ctx.link(top));
        assert_eq!(ctx.sink().diagnostics()[0].code, errors::W201);
    }

    #[test]
    fn freeze_remaps_reachable_chips() {
        let (mut ctx, top) = context(AND_OR3);
        ctx.chip("Xor");
        let netlist = ctx.freeze(top).unwrap().unwrap();
        assert_eq!(netlist.len(), 3);
        let chip = netlist.top_chip().unwrap();
        assert_eq!(chip.kind, ChipKind::Composite);
        assert_eq!(chip.pins.len(), 5);
        for part in chip.parts.values() {
            assert!(matches!(netlist.chip(part.chip).unwrap().kind, ChipKind::Gate(_)));
        }
    }

    #[test]
    fn freeze_refuses_failed_link() {
        let (mut ctx, top) = context("CHIP T { IN a; OUT o; PARTS: Nope(a=a, o=o); }");
        assert!(ctx.freeze(top).unwrap().is_none());
    }

    #[test]
    fn elaborate_by_name() {
        let (mut ctx, _) = context(AND_OR3);
        assert!(ctx.elaborate("andor3").unwrap().is_some());
        assert!(ctx.elaborate("Other").unwrap().is_none());
    }

    #[test]
    fn range_within_synthesized_net_reports_reversed() {
        let (mut ctx, top) = context("CHIP T { IN a; OUT o; PARTS: Not(in=a, out=n[2..1]); Not(in=a, out=o); }");
        assert!(!ctx.link(top));
        assert!(ctx.sink().diagnostics().iter().any(|d| d.code == errors::E209));
    }
}
