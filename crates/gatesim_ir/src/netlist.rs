//! The frozen, linked definition graph.
//!
//! A [`Netlist`] holds every chip reachable from a top chip, with each
//! part's chip reference replaced by a [`ChipId`] into the netlist's own
//! table. Nothing in it can be changed after construction, so one netlist
//! may back any number of concurrent simulations.

use crate::arena::Arena;
use crate::gate::GateKind;
use crate::ids::{ChipId, PartId, PinId};
use crate::pin::{BitRange, Pin, PinKind};
use gatesim_common::Ident;
use gatesim_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which way a wire carries its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireDirection {
    /// Parent drives a child input.
    Drive,
    /// A child output drives the parent.
    Sense,
}

/// A linked connection between a child pin and a parent pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    /// Pin of the instantiated chip.
    pub child: PinId,
    /// Window on the child pin; `None` for the whole pin.
    pub child_range: Option<BitRange>,
    /// Pin of the enclosing chip.
    pub parent: PinId,
    /// Window on the parent pin; `None` for the whole pin.
    pub parent_range: Option<BitRange>,
    /// Copy direction.
    pub direction: WireDirection,
}

/// Whether a chip is a primitive or built from parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipKind {
    /// A built-in gate evaluated directly.
    Gate(GateKind),
    /// A chip evaluated by settling its parts.
    Composite,
}

/// A linked part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Slot in the parent's child-state array.
    pub index: PartId,
    /// The instantiated chip.
    pub chip: ChipId,
    /// The instantiated chip's name as written at the call site.
    pub name: Ident,
    /// Wires in connection order.
    pub wires: Vec<Wire>,
    /// Source location of the instantiation.
    pub span: Span,
}

/// A linked chip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chip {
    /// The chip name as written.
    pub name: Ident,
    /// Gate or composite.
    pub kind: ChipKind,
    /// Pins, indexed by [`PinId`].
    pub pins: Arena<PinId, Pin>,
    /// Parts, indexed by [`PartId`].
    pub parts: Arena<PartId, Part>,
    pin_keys: HashMap<Ident, PinId>,
}

impl Chip {
    /// Creates a linked chip. `pins` must be indexed by their own `index`.
    pub fn new(name: Ident, kind: ChipKind, pins: Arena<PinId, Pin>, parts: Arena<PartId, Part>) -> Self {
        let pin_keys = pins.iter().map(|(id, pin)| (pin.key, id)).collect();
        Self {
            name,
            kind,
            pins,
            parts,
            pin_keys,
        }
    }

    /// Finds a pin by case-folded key.
    pub fn find_pin(&self, key: Ident) -> Option<PinId> {
        self.pin_keys.get(&key).copied()
    }

    /// Returns the pin with the given ID.
    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(id)
    }

    /// Input pins in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values().filter(|p| p.kind == PinKind::Input)
    }

    /// Output pins in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values().filter(|p| p.kind == PinKind::Output)
    }

    /// Total bit width of all inputs.
    pub fn input_bits(&self) -> u32 {
        self.inputs().map(|p| p.width).sum()
    }
}

/// Every chip reachable from a top chip, linked and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    chips: Arena<ChipId, Chip>,
    top: ChipId,
}

impl Netlist {
    /// Creates a netlist. Every [`Part::chip`] must index into `chips`.
    pub fn new(chips: Arena<ChipId, Chip>, top: ChipId) -> Self {
        Self { chips, top }
    }

    /// The chip the netlist was frozen from.
    pub fn top(&self) -> ChipId {
        self.top
    }

    /// Returns a chip by ID.
    pub fn chip(&self, id: ChipId) -> Option<&Chip> {
        self.chips.get(id)
    }

    /// Returns the top chip.
    pub fn top_chip(&self) -> Option<&Chip> {
        self.chip(self.top)
    }

    /// Iterates over all chips.
    pub fn chips(&self) -> impl Iterator<Item = (ChipId, &Chip)> {
        self.chips.iter()
    }

    /// Number of distinct chips.
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Returns `true` if the netlist holds no chips.
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}
